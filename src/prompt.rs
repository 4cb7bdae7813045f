use dialoguer::Confirm;

pub trait Prompt {
    /// Asks whether a batch of `size` images should be processed.
    fn confirm_large_batch(&self, size: usize) -> bool;
}

/// Interactive yes/no question on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm_large_batch(&self, size: usize) -> bool {
        let answer = Confirm::new()
            .with_prompt(confirm_message(size))
            .default(false)
            .interact_opt();

        match answer {
            Ok(Some(confirmed)) => confirmed,
            Ok(None) => false,
            Err(e) => {
                // No terminal attached, treat as a "no"
                tracing::warn!("Unable to ask for confirmation: {}", e);
                false
            }
        }
    }
}

fn confirm_message(size: usize) -> String {
    format!("Do you want to process {} images?", size)
}
