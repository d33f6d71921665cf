use std::io::Write;
use std::process::{Command, Stdio};

use super::NumeralRenderer;
use crate::error::{Result, StatsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Font,
    Left,
    Right,
    Center,
}

impl Justification {
    fn flag(self) -> &'static str {
        match self {
            Justification::Font => "-x",
            Justification::Left => "-l",
            Justification::Right => "-r",
            Justification::Center => "-c",
        }
    }
}

const FIGLET_PROGRAM: &str = "figlet";

/// Print direction, settings key `figletDirection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Font,
    LeftToRight,
    RightToLeft,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Font, Direction::LeftToRight, Direction::RightToLeft];

    pub fn key(self) -> &'static str {
        match self {
            Direction::Font => "font",
            Direction::LeftToRight => "leftToRight",
            Direction::RightToLeft => "rightToLeft",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| direction.key() == key)
    }

    fn flag(self) -> &'static str {
        match self {
            Direction::Font => "-X",
            Direction::LeftToRight => "-L",
            Direction::RightToLeft => "-R",
        }
    }
}

/// Horizontal layout of the glyphs, settings key `figletSpacing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    #[default]
    Smush,
    ForceSmush,
    Kern,
    FullWidth,
    Overlap,
}

impl Spacing {
    pub const ALL: [Spacing; 5] = [
        Spacing::Smush,
        Spacing::ForceSmush,
        Spacing::Kern,
        Spacing::FullWidth,
        Spacing::Overlap,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Spacing::Smush => "smush",
            Spacing::ForceSmush => "forceSmush",
            Spacing::Kern => "kern",
            Spacing::FullWidth => "fullWidth",
            Spacing::Overlap => "overlap",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|spacing| spacing.key() == key)
    }

    fn flag(self) -> &'static str {
        match self {
            Spacing::Smush => "-s",
            Spacing::ForceSmush => "-S",
            Spacing::Kern => "-k",
            Spacing::FullWidth => "-W",
            Spacing::Overlap => "-o",
        }
    }
}

/// Renders text through the `figlet` binary.
#[derive(Debug, Clone, Default)]
pub struct Figlet {
    pub font: Option<String>,
    pub direction: Direction,
    pub spacing: Spacing,
}

impl Figlet {
    /// Command-line flags for one invocation. Without a width figlet is told to
    /// use the terminal width (`-t`).
    pub fn args(&self, width: Option<usize>, justification: Justification) -> Vec<String> {
        let mut args = vec![
            justification.flag().to_string(),
            self.direction.flag().to_string(),
            self.spacing.flag().to_string(),
        ];
        if let Some(font) = &self.font {
            args.push("-f".to_string());
            args.push(font.clone());
        }
        match width {
            Some(width) => {
                args.push("-w".to_string());
                args.push(width.to_string());
            }
            None => args.push("-t".to_string()),
        }
        args
    }
}

impl NumeralRenderer for Figlet {
    fn render(&self, text: &str, width: Option<usize>, justification: Justification) -> Result<String> {
        let mut child = Command::new(FIGLET_PROGRAM)
            .args(self.args(width, justification))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StatsError::Render(format!("could not start {FIGLET_PROGRAM}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(StatsError::Render(format!(
                "{FIGLET_PROGRAM} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Place two rendered blocks side by side, line by line. The left block is
/// padded to its widest line; output stops at the shorter block.
pub fn concat_blocks(left: &str, right: &str) -> String {
    let width = block_width(left);

    left.lines()
        .zip(right.lines())
        .map(|(l, r)| format!("{l:<width$}{r}"))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Widest line of a rendered block, in characters.
pub fn block_width(block: &str) -> usize {
    block.lines().map(|line| line.chars().count()).max().unwrap_or(0)
}
