//! Prompt builders
//!
//! 故事提示词与场景插图提示词

use crate::domain::{truncate_chars, Scene, StoryBrief};

/// 插图提示词中场景描述的最大字符数
pub const IMAGE_SCENE_CHARS: usize = 300;

/// 插图提示词中最多引用的对白数
pub const IMAGE_DIALOGUE_LIMIT: usize = 2;

/// 构建故事生成提示词
///
/// 要求模型输出 `SCENE X:` 分节的小说体正文，对白使用双引号，
/// 以便场景分割器与对白提取器处理
pub fn build_story_prompt(brief: &StoryBrief) -> String {
    let hero = &brief.hero.name;
    let scenes = brief.scene_count;

    let mut context = format!(
        r#"Write a captivating {genre} story that reads like a published novel, with exactly {scenes} scenes.

CHARACTERS:
- {hero_desc}
- {companion_desc}

STORY REQUIREMENTS:
1. Create a single, iconic location that serves as the setting for the entire story
2. Develop a compelling narrative arc with beginning, middle, and climactic end
3. Include a quest or challenge that requires both characters to work together
4. Show character development and emotional depth
5. Each scene should be visually rich and cinematic

WRITING STYLE:
- Write in narrative prose with flowing paragraphs like a real book
- Integrate dialogue naturally into the narrative using quotation marks
- Show, don't just tell - use vivid descriptions and sensory details
- Create atmosphere and tension through your writing
- Make it feel like reading an epic adventure novel
- Use literary techniques like metaphors and descriptive language

OUTPUT FORMAT:
For each of the {scenes} scenes:

SCENE X:
[Write 2-4 flowing narrative paragraphs that read like a novel. Include:
- Rich scene-setting descriptions
- Character actions and emotions
- Natural dialogue woven into the narrative like: {hero} stepped forward. "We must find the ancient artifact," he said, determination in his eyes.
- Atmospheric details that bring the scene to life]

Make the reader feel immersed in the story. Write as if this is going to be published.
"#,
        genre = brief.genre,
        hero_desc = brief.hero.description(),
        companion_desc = brief.companion.description(),
    );

    let custom = brief.custom_prompt.trim();
    if !custom.is_empty() {
        context.push_str(&format!("\nADDITIONAL REQUIREMENTS: {}\n", custom));
    }

    format!(
        r#"As a team of expert authors (Story Planner, Character Developer, Dialogue Writer, Scene Designer, and Story Editor), write a captivating narrative:

{context}

Write the complete {scenes}-scene story now in beautiful narrative prose. For each scene:
1. Write 2-4 flowing paragraphs of narrative text
2. Weave dialogue naturally into the prose using quotation marks
3. Create vivid, atmospheric descriptions
4. Show character emotions and development
5. Make it feel like reading a published novel

Remember: This should read like a real book, not a script. Immerse the reader in the story with rich, flowing narrative paragraphs."#
    )
}

/// 插图提示词中的对白上下文：最多 2 句，`speaker: text` 以 ` | ` 连接
pub fn dialogue_context(scene: &Scene) -> String {
    scene
        .dialogues()
        .iter()
        .take(IMAGE_DIALOGUE_LIMIT)
        .map(|d| d.as_caption())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// 构建单个场景的插图提示词
pub fn build_image_prompt(scene: &Scene, brief: &StoryBrief) -> String {
    let description = truncate_chars(scene.description(), IMAGE_SCENE_CHARS);
    let dialogue = dialogue_context(scene);
    let dialogue = if dialogue.is_empty() {
        "Characters conversing".to_string()
    } else {
        dialogue
    };

    format!(
        "Comic book art style, cinematic digital art, single panel, full frame, dynamic angle.\n\
         Scene: {description}\n\
         Characters: {hero} and {companion} interacting in a {genre} setting.\n\
         Dialogue context: {dialogue}\n\
         High quality, detailed, vibrant colors, dramatic lighting, professional comic book illustration with speech bubbles visible.",
        hero = brief.hero.visual(),
        companion = brief.companion.visual(),
        genre = brief.genre,
    )
}
