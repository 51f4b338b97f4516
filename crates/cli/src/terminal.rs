use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const PROMPT: Color = Color::Green;
    const STEP: Color = Color::Cyan;
    const SUCCESS: Color = Color::DarkGreen;
    const WARNING: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

const RULE_WIDTH: usize = 80;

/// Console output and prompts for the interactive workflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal {
    /// Suppress everything except prompts.
    quiet: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    fn write(&self, color: Color, text: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = io::stdout();
        execute!(stdout, SetForegroundColor(color), Print(text), ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the welcome banner describing the workflow.
    pub fn print_banner(&self) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        self.write(
            Colors::HEADER,
            &format!(
                "\n{rule}\n{:^width$}\n{rule}\n",
                "WELCOME TO THE CONTRACT REVISION TOOL",
                width = RULE_WIDTH
            ),
        )?;
        self.write(
            Colors::DIM,
            &format!(
                "\nThis tool revises contracts to align with your company's\n\
                 policies and knowledge base.\n\
                 \nThe process includes:\n\
                 1. Selecting a contract file (PDF or DOCX)\n\
                 2. Analyzing the contract against your knowledge base\n\
                 3. Revising the contract to align with company policies\n\
                 4. Saving the revised contract\n\
                 \n{rule}\n\n"
            ),
        )
    }

    /// Print a numbered pipeline step.
    pub fn print_step(&self, number: u8, msg: &str) -> Result<()> {
        self.write(Colors::STEP, &format!("\nStep {number}: {msg}\n"))
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        self.write(Colors::DIM, &format!("{msg}\n"))
    }

    pub fn print_success(&self, msg: &str) -> Result<()> {
        self.write(Colors::SUCCESS, &format!("{msg}\n"))
    }

    pub fn print_warning(&self, msg: &str) -> Result<()> {
        self.write(Colors::WARNING, &format!("Warning: {msg}\n"))
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        self.write(Colors::ERROR, &format!("Error: {msg}\n"))
    }

    /// Print `prompt` and read one trimmed line from stdin.
    pub fn read_line(&self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::PROMPT),
            Print(prompt),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Ask a y/n question. Only "y" or "yes" count as yes.
    pub fn prompt_yes_no(&self, question: &str) -> Result<bool> {
        let answer = self.read_line(&format!("\n{question} (y/n): "))?;
        Ok(is_yes(&answer))
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
