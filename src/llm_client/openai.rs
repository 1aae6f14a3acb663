use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};

use super::{LlmClientError, LlmService};

const SYSTEM_PROMPT: &str = "You are a travel assistant. Answer the question using only the \
passages provided. If the passages do not contain the answer, say that you do not know \
instead of guessing.";

/// Every passage goes into a single prompt, best first.
pub(crate) fn stuff_prompt(question: &str, passages: &[String]) -> String {
    let context = passages
        .iter()
        .enumerate()
        .map(|(n, passage)| format!("[{}] {}", n + 1, passage.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Passages:\n\n{context}\n\nQuestion: {question}\nAnswer:")
}

/// Any OpenAI compatible chat completion endpoint, Groq by default.
pub(crate) struct OpenAiChatClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u16,
}

impl OpenAiChatClient {
    pub(crate) fn new(
        client: Client<OpenAIConfig>,
        model_name: String,
        temperature: f32,
        max_tokens: u16,
    ) -> Self {
        Self {
            client,
            model_name,
            temperature,
            max_tokens,
        }
    }
}

impl LlmService for OpenAiChatClient {
    async fn answer(&self, question: &str, passages: &[String]) -> Result<String, LlmClientError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(stuff_prompt(question, passages))
                .build()?
                .into(),
        ];
        let request = CreateChatCompletionRequestArgs::default()
            .max_tokens(self.max_tokens)
            .model(&self.model_name)
            .temperature(self.temperature)
            .n(1)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let response = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmClientError::EmptyResponse)?
            .message
            .content
            .ok_or(LlmClientError::EmptyResponse)?;
        Ok(response)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prompt_numbers_passages_in_rank_order() {
        let prompt = stuff_prompt(
            "What should I see in Paris?",
            &[
                String::from("The Louvre is the largest museum."),
                String::from("  The Eiffel Tower is iconic.  "),
            ],
        );
        assert_eq!(
            prompt,
            "Passages:\n\n[1] The Louvre is the largest museum.\n\n[2] The Eiffel Tower is iconic.\n\nQuestion: What should I see in Paris?\nAnswer:"
        );
    }
}
