use crate::prompt::PartialChatPrompt;
use anyhow::Result;

pub trait FillPlaceholders {
    fn placeholders_to_fill(&self) -> &Vec<String>;
}

pub trait Fill: FillPlaceholders {
    fn fill(&self, partial_prompt: &mut PartialChatPrompt) -> Result<()>;
}

pub trait FillMut: FillPlaceholders {
    fn fill_mut(&mut self, partial_prompt: &mut PartialChatPrompt) -> Result<()>;
}

pub trait FillWith<CTX>: FillPlaceholders {
    fn fill_with(&self, partial_prompt: &mut PartialChatPrompt, context: CTX) -> Result<CTX>;
}

pub trait FillWithMut<CTX>: FillPlaceholders {
    fn fill_with_mut(&mut self, partial_prompt: &mut PartialChatPrompt, context: CTX) -> Result<CTX>;
}

impl<T: FillWith<()>> Fill for T {
    fn fill(&self, partial_prompt: &mut PartialChatPrompt) -> Result<()> {
        self.fill_with(partial_prompt, ())?;
        Ok(())
    }
}

impl<T: FillWithMut<()>> FillMut for T {
    fn fill_mut(&mut self, partial_prompt: &mut PartialChatPrompt) -> Result<()> {
        self.fill_with_mut(partial_prompt, ())?;
        Ok(())
    }
}

#[cfg(test)]
mod test_filler {
    use crate::prompt::{ChatTemplate, PartialChatPrompt};
    use super::{Fill, FillPlaceholders, FillWith};

    struct TodayFiller {
        placeholders: Vec<String>,
        date: String,
    }

    impl FillPlaceholders for TodayFiller {
        fn placeholders_to_fill(&self) -> &Vec<String> {
            &self.placeholders
        }
    }

    impl FillWith<()> for TodayFiller {
        fn fill_with(&self, partial_prompt: &mut PartialChatPrompt, context: ()) -> anyhow::Result<()> {
            partial_prompt.try_fill("date", self.date.as_str())?;
            Ok(context)
        }
    }

    #[test]
    fn test_filler_fills_chat_prompt() {
        let template = ChatTemplate::new()
            .system("You are a friendly assistant. Today is {[date]}.")
            .human("Good morning!");
        let mut partial_prompt = template.construct_prompt();
        let filler = TodayFiller {
            placeholders: vec!["date".to_string()],
            date: "2024-06-01".to_string(),
        };
        assert_eq!(filler.placeholders_to_fill().len(), 1);
        filler.fill(&mut partial_prompt).unwrap();
        let messages = partial_prompt.complete().unwrap();
        assert_eq!(messages[0].content, "You are a friendly assistant. Today is 2024-06-01.");
    }
}
