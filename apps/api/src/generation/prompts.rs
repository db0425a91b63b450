// Prompt construction for the post generation call.
// The model has no system instruction; everything it needs is in this one prompt.

use crate::generation::generator::GenerationRequest;

/// Literal example of the JSON shape the model is asked to return.
pub const OUTPUT_SCHEMA_EXAMPLE: &str = r#"{
  "posts": [
    {
      "platform": "Twitter/X",
      "content": "post text here",
      "hashtags": ["tag1", "tag2", "tag3"],
      "bestTime": "9 AM - 11 AM EST"
    }
  ]
}"#;

/// Builds the single prompt sent to the model for a validated request.
pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    format!(
        r#"Create engaging social media posts about "{topic}".

Target Audience: {audience}
Tone: {tone}

Create posts for these platforms: {platforms}

For each platform, provide:
1. Platform name
2. The post content
3. 3-5 relevant hashtags
4. Best time to post (general suggestion)

Make the posts engaging, platform-appropriate, and optimized for engagement.
Return exactly one entry per requested platform.

Format the response as JSON like this:
{schema}"#,
        topic = request.topic,
        audience = request.target_audience,
        tone = request.tone,
        platforms = request.platforms.join(", "),
        schema = OUTPUT_SCHEMA_EXAMPLE,
    )
}
