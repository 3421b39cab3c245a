//! Taleweaver - 插图故事生成服务
//!
//! - Domain: 场景分割、对白提取、故事排版
//! - Application: 故事生成用例、端口、提示词
//! - Infrastructure: http, adapters (Gemini / 文生图)

use std::sync::Arc;

use taleweaver::application::{
    GenerateStoryHandler, GenerationSettings, ImageGeneratorPort, StoryWriterPort,
};
use taleweaver::config::{load_config, print_config, AppConfig, ImageProvider, LlmProvider};
use taleweaver::domain::SceneSegmenter;
use taleweaver::infrastructure::adapters::{
    FakeImageClient, FakeStoryWriter, GeminiClientConfig, GeminiStoryWriter, HttpImageClient,
    HttpImageClientConfig,
};
use taleweaver::infrastructure::http::{AppState, HttpServer, ServerConfig};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},taleweaver={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_story_writer(config: &AppConfig) -> anyhow::Result<Arc<dyn StoryWriterPort>> {
    match config.llm.provider {
        LlmProvider::Gemini => {
            if config.llm.api_key.is_none() {
                tracing::warn!("No Gemini API key configured, story generation will fail");
            }
            let gemini_config =
                GeminiClientConfig::new(config.llm.api_key.clone().unwrap_or_default())
                    .with_base_url(&config.llm.base_url)
                    .with_timeout(config.llm.timeout_secs);
            Ok(Arc::new(GeminiStoryWriter::new(gemini_config)?))
        }
        LlmProvider::Fake => Ok(Arc::new(FakeStoryWriter::with_defaults())),
    }
}

fn build_image_generator(config: &AppConfig) -> anyhow::Result<Arc<dyn ImageGeneratorPort>> {
    match config.image.provider {
        ImageProvider::Http => {
            let image_config = HttpImageClientConfig::new(&config.image.url)
                .with_timeout(config.image.timeout_secs);
            Ok(Arc::new(HttpImageClient::new(image_config)?))
        }
        ImageProvider::Fake => Ok(Arc::new(FakeImageClient::new())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Taleweaver - 插图故事生成服务");
    print_config(&config);

    let story_writer = build_story_writer(&config)?;
    let image_generator = build_image_generator(&config)?;

    let settings = GenerationSettings {
        max_scenes: config.story.max_scenes,
        max_concurrent_images: config.image.max_concurrent,
        image_width: config.image.width,
        image_height: config.image.height,
        max_output_tokens: config.llm.max_output_tokens,
    };
    let handler = GenerateStoryHandler::new(
        story_writer.clone(),
        image_generator.clone(),
        SceneSegmenter::default(),
        settings,
    );

    let mut server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_body_limit(config.server.body_limit_bytes);
    if config.server.static_files.enabled {
        server_config = server_config.with_static_dir(&config.server.static_files.dir);
    }

    let state = AppState::new(story_writer, image_generator, handler);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
