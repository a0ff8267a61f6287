// Prompt constants for the topic recommendation call.

/// System prompt for the completion call.
pub const RECOMMEND_SYSTEM: &str = "You are a helpful assistant.";

/// Recommendation prompt template. Replace `{titles}` with the collected
/// titles, one `- ` bullet per line, before sending.
pub const RECOMMEND_PROMPT_TEMPLATE: &str = r#"你现在是一个文案编写大师，根据我提供你的文章标题，帮我推荐10个有价值的选题，符合我公众号自媒体的风格。

已有文章标题：
{titles}

请给出10个新的选题建议，要求：
1. 符合现有文章的风格和主题
2. 具有实用性和吸引力
3. 标题要有吸引力
4. 每个标题都要简洁明了
"#;
