//! Story Command Handlers

use std::sync::Arc;
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine};
use futures_util::future::join_all;
use tokio::sync::Semaphore;

use crate::application::commands::story_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    GeneratedImage, ImageGeneratorPort, ImageRequest, StoryWriteRequest, StoryWriterPort,
};
use crate::application::prompts::{build_image_prompt, build_story_prompt};
use crate::domain::{format_story, Scene, SceneSegmenter, StoryBrief};

/// 故事生成参数
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// 单次请求允许的最大场景数
    pub max_scenes: usize,
    /// 同时进行的插图请求数
    pub max_concurrent_images: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_scenes: 10,
            max_concurrent_images: 3,
            image_width: 1024,
            image_height: 1024,
            max_output_tokens: 6000,
        }
    }
}

/// 将图片编码为 data URL
pub fn to_data_url(image: &GeneratedImage) -> String {
    format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.bytes))
}

/// GenerateStory Handler - 生成带插图的故事
///
/// 流程: 提示词 → 大模型 → 场景分割 / 排版 → 并发生成插图
pub struct GenerateStoryHandler {
    story_writer: Arc<dyn StoryWriterPort>,
    image_generator: Arc<dyn ImageGeneratorPort>,
    segmenter: SceneSegmenter,
    settings: GenerationSettings,
}

impl GenerateStoryHandler {
    pub fn new(
        story_writer: Arc<dyn StoryWriterPort>,
        image_generator: Arc<dyn ImageGeneratorPort>,
        segmenter: SceneSegmenter,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            story_writer,
            image_generator,
            segmenter,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: GenerateStoryCommand,
    ) -> Result<GenerateStoryResponse, ApplicationError> {
        let started = Instant::now();
        let brief = self.validate(&cmd)?;

        tracing::info!(
            model = %cmd.model,
            genre = %brief.genre,
            hero = %brief.hero.name,
            companion = %brief.companion.name,
            scene_count = brief.scene_count,
            "Generating story"
        );

        let request = StoryWriteRequest {
            prompt: build_story_prompt(&brief),
            model: cmd.model.clone(),
            temperature: cmd.temperature,
            max_output_tokens: self.settings.max_output_tokens,
        };
        let generated = self.story_writer.write_story(request).await?;

        tracing::info!(
            model = %generated.model,
            chars = generated.text.chars().count(),
            "Story text generated"
        );

        let scenes = self.segmenter.segment(
            &generated.text,
            brief.scene_count,
            &brief.hero.name,
            &brief.companion.name,
        );
        let story = format_story(&generated.text);

        let images = self.illustrate(scenes, &brief).await;

        tracing::info!(
            images = images.len(),
            scene_count = brief.scene_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Story generation completed"
        );

        Ok(GenerateStoryResponse {
            story,
            images,
            model: generated.model,
        })
    }

    fn validate(&self, cmd: &GenerateStoryCommand) -> Result<StoryBrief, ApplicationError> {
        let mut hero = cmd.hero.clone();
        let mut companion = cmd.companion.clone();
        hero.name = hero.name.trim().to_string();
        companion.name = companion.name.trim().to_string();

        if hero.name.is_empty() {
            return Err(ApplicationError::validation("character1_name cannot be empty"));
        }
        if companion.name.is_empty() {
            return Err(ApplicationError::validation("character2_name cannot be empty"));
        }
        if hero.name.to_lowercase() == companion.name.to_lowercase() {
            return Err(ApplicationError::validation(
                "character1_name and character2_name must be different",
            ));
        }
        if cmd.scene_count == 0 || cmd.scene_count > self.settings.max_scenes {
            return Err(ApplicationError::validation(format!(
                "num_images must be between 1 and {}",
                self.settings.max_scenes
            )));
        }
        if !cmd.temperature.is_finite() || !(0.0..=2.0).contains(&cmd.temperature) {
            return Err(ApplicationError::validation(
                "temperature must be between 0.0 and 2.0",
            ));
        }

        Ok(StoryBrief {
            genre: cmd.genre.trim().to_string(),
            hero,
            companion,
            custom_prompt: cmd.custom_prompt.clone(),
            scene_count: cmd.scene_count,
        })
    }

    /// 为每个场景生成插图
    ///
    /// 并发数受 `max_concurrent_images` 限制，结果保持场景顺序；
    /// 失败的场景记录日志后跳过
    async fn illustrate(&self, scenes: Vec<Scene>, brief: &StoryBrief) -> Vec<IllustratedScene> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_images.max(1)));

        let tasks = scenes.into_iter().enumerate().map(|(index, scene)| {
            let semaphore = semaphore.clone();
            let image_generator = self.image_generator.clone();
            let request = ImageRequest {
                prompt: build_image_prompt(&scene, brief),
                width: self.settings.image_width,
                height: self.settings.image_height,
            };

            async move {
                let _permit = semaphore.acquire_owned().await.ok()?;

                tracing::debug!(scene_index = index, "Generating scene image");
                match image_generator.generate(request).await {
                    Ok(image) => {
                        let (description, dialogues) = scene.into_parts();
                        Some(IllustratedScene {
                            image: to_data_url(&image),
                            scene: description,
                            dialogues,
                        })
                    }
                    Err(e) => {
                        tracing::error!(
                            scene_index = index,
                            error = %e,
                            "Image generation failed, skipping scene"
                        );
                        None
                    }
                }
            }
        });

        join_all(tasks).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{GeneratedStory, ImageError, LlmError};
    use crate::domain::CharacterProfile;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const STORY: &str = "The Ember Vault\n\n\
        SCENE 1: The vault door groaned open.\nAria said, \"Stay behind me, it is dark.\"\n\n\
        SCENE 2: Dust drifted through the hall.\n\n\n\nBoros shouted, \"Look out, the floor!\"\n\
        SCENE 3: The relic glowed softly.";

    struct StubWriter {
        result: Mutex<Option<Result<GeneratedStory, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubWriter {
        fn ok(text: &str) -> Self {
            Self {
                result: Mutex::new(Some(Ok(GeneratedStory {
                    text: text.to_string(),
                    model: "stub-model".to_string(),
                }))),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: LlmError) -> Self {
            Self {
                result: Mutex::new(Some(Err(err))),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StoryWriterPort for StubWriter {
        async fn write_story(&self, request: StoryWriteRequest) -> Result<GeneratedStory, LlmError> {
            self.prompts.lock().unwrap().push(request.prompt);
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(LlmError::ServiceError("called twice".to_string())))
        }
    }

    /// 记录最大并发数；提示词包含 `fail_on` 时返回错误
    struct StubImages {
        fail_on: Option<&'static str>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl StubImages {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                fail_on,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageGeneratorPort for StubImages {
        async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(marker) = self.fail_on {
                if request.prompt.contains(marker) {
                    return Err(ImageError::ServiceError("boom".to_string()));
                }
            }
            Ok(GeneratedImage {
                bytes: vec![1, 2, 3],
                mime_type: "image/png".to_string(),
            })
        }
    }

    fn command(scene_count: usize) -> GenerateStoryCommand {
        GenerateStoryCommand {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.8,
            genre: "Fantasy".to_string(),
            hero: CharacterProfile::new("Aria"),
            companion: CharacterProfile::new("Boros"),
            custom_prompt: String::new(),
            scene_count,
        }
    }

    fn handler(
        writer: Arc<StubWriter>,
        images: Arc<StubImages>,
        settings: GenerationSettings,
    ) -> GenerateStoryHandler {
        GenerateStoryHandler::new(writer, images, SceneSegmenter::default(), settings)
    }

    #[tokio::test]
    async fn test_generates_story_and_images_in_scene_order() {
        let writer = Arc::new(StubWriter::ok(STORY));
        let images = Arc::new(StubImages::new(None));
        let handler = handler(writer.clone(), images.clone(), GenerationSettings::default());

        let response = handler.handle(command(3)).await.unwrap();

        assert_eq!(response.model, "stub-model");
        assert_eq!(response.images.len(), 3);
        assert!(response.images[0].scene.starts_with("The vault door groaned open."));
        assert_eq!(response.images[0].dialogues[0].speaker(), "Aria");
        assert_eq!(response.images[1].dialogues[0].text(), "Look out, the floor!");
        assert_eq!(response.images[2].scene, "The relic glowed softly.");
        assert_eq!(response.images[0].image, "data:image/png;base64,AQID");

        assert!(!response.story.contains("SCENE"));
        assert!(response.story.starts_with("The vault door groaned open."));
        assert!(!response.story.contains("\n\n\n"));

        let prompts = writer.prompts.lock().unwrap();
        assert!(prompts[0].contains("exactly 3 scenes"));
    }

    #[tokio::test]
    async fn test_failed_image_is_skipped() {
        let writer = Arc::new(StubWriter::ok(STORY));
        let images = Arc::new(StubImages::new(Some("Dust drifted")));
        let handler = handler(writer, images.clone(), GenerationSettings::default());

        let response = handler.handle(command(3)).await.unwrap();

        assert_eq!(images.calls.load(Ordering::SeqCst), 3);
        assert_eq!(response.images.len(), 2);
        assert!(response.images[1].scene.starts_with("The relic"));
    }

    #[tokio::test]
    async fn test_image_concurrency_is_bounded() {
        let raw = (1..=6)
            .map(|i| format!("SCENE {}: Moment {}.", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let writer = Arc::new(StubWriter::ok(&raw));
        let images = Arc::new(StubImages::new(None));
        let settings = GenerationSettings {
            max_concurrent_images: 2,
            ..Default::default()
        };
        let handler = handler(writer, images.clone(), settings);

        let response = handler.handle(command(6)).await.unwrap();

        assert_eq!(response.images.len(), 6);
        assert!(images.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_llm_quota_error_surfaces() {
        let writer = Arc::new(StubWriter::failing(LlmError::QuotaExceeded("429".to_string())));
        let images = Arc::new(StubImages::new(None));
        let handler = handler(writer, images.clone(), GenerationSettings::default());

        let err = handler.handle(command(3)).await.unwrap_err();

        assert!(matches!(err, ApplicationError::QuotaExceeded(_)));
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let settings = GenerationSettings {
            max_scenes: 5,
            ..Default::default()
        };
        let writer = Arc::new(StubWriter::ok(STORY));
        let images = Arc::new(StubImages::new(None));
        let handler = handler(writer.clone(), images, settings);

        let mut cmd = command(0);
        assert!(matches!(
            handler.handle(cmd.clone()).await,
            Err(ApplicationError::ValidationError(_))
        ));

        cmd.scene_count = 6;
        assert!(handler.handle(cmd.clone()).await.is_err());

        cmd.scene_count = 3;
        cmd.companion.name = "  aria ".to_string();
        assert!(handler.handle(cmd.clone()).await.is_err());

        cmd.companion.name = "Boros".to_string();
        cmd.hero.name = "   ".to_string();
        assert!(handler.handle(cmd.clone()).await.is_err());

        cmd.hero.name = "Aria".to_string();
        cmd.temperature = 3.5;
        assert!(handler.handle(cmd).await.is_err());

        // 验证失败时不调用大模型
        assert!(writer.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_data_url() {
        let image = GeneratedImage {
            bytes: b"png".to_vec(),
            mime_type: "image/png".to_string(),
        };
        assert_eq!(to_data_url(&image), "data:image/png;base64,cG5n");
    }
}
