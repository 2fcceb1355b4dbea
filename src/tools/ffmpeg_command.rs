use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error(
        "argument template must use {{input}} and {{output}} exactly once each or not at all (found {input} and {output})"
    )]
    PlaceholderCount { input: usize, output: usize },
    #[error("{{input}} and {{output}} must be separate arguments, not both in {0:?}")]
    SharedToken(String),
}

/// What the tool should do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    Overwrite,
    Keep,
}

impl OverwritePolicy {
    #[must_use]
    pub const fn from_overwrite(overwrite: bool) -> Self {
        if overwrite { Self::Overwrite } else { Self::Keep }
    }

    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Overwrite => "-y",
            Self::Keep => "-n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `-i <input> <params…> <flag> <output>`
    Implicit,
    /// Placeholders mark where the paths go.
    Explicit,
}

/// A preset's `params` string split into tokens, with input/output placement resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentTemplate {
    tokens: Vec<String>,
    layout: Layout,
}

impl ArgumentTemplate {
    pub fn parse(params: &str) -> Result<Self, TemplateError> {
        let tokens: Vec<String> = params.split_whitespace().map(str::to_string).collect();
        let input = count_placeholder(&tokens, INPUT_PLACEHOLDER);
        let output = count_placeholder(&tokens, OUTPUT_PLACEHOLDER);

        if let Some(token) = tokens
            .iter()
            .find(|t| t.contains(INPUT_PLACEHOLDER) && t.contains(OUTPUT_PLACEHOLDER))
        {
            return Err(TemplateError::SharedToken(token.clone()));
        }

        let layout = match (input, output) {
            (0, 0) => Layout::Implicit,
            (1, 1) => Layout::Explicit,
            (input, output) => return Err(TemplateError::PlaceholderCount { input, output }),
        };

        Ok(Self { tokens, layout })
    }

    #[must_use]
    pub fn render(&self, input: &Path, output: &Path, overwrite: OverwritePolicy) -> Vec<OsString> {
        match self.layout {
            Layout::Implicit => {
                let mut args = Vec::with_capacity(self.tokens.len() + 4);
                args.push(OsString::from("-i"));
                args.push(input.as_os_str().to_owned());
                args.extend(self.tokens.iter().map(OsString::from));
                args.push(OsString::from(overwrite.flag()));
                args.push(output.as_os_str().to_owned());
                args
            }
            Layout::Explicit => {
                let mut args = Vec::with_capacity(self.tokens.len() + 1);
                for token in &self.tokens {
                    if token.contains(OUTPUT_PLACEHOLDER) {
                        args.push(OsString::from(overwrite.flag()));
                        args.push(substitute(token, OUTPUT_PLACEHOLDER, output));
                    } else if token.contains(INPUT_PLACEHOLDER) {
                        args.push(substitute(token, INPUT_PLACEHOLDER, input));
                    } else {
                        args.push(OsString::from(token));
                    }
                }
                args
            }
        }
    }
}

fn count_placeholder(tokens: &[String], placeholder: &str) -> usize {
    tokens.iter().map(|t| t.matches(placeholder).count()).sum()
}

fn substitute(token: &str, placeholder: &str, path: &Path) -> OsString {
    if token == placeholder {
        return path.as_os_str().to_owned();
    }
    OsString::from(token.replace(placeholder, &path.to_string_lossy()))
}

/// Parses `params` and renders the full argument vector in one step.
pub fn build_arguments(
    params: &str,
    input: &Path,
    output: &Path,
    overwrite: OverwritePolicy,
) -> Result<Vec<OsString>, TemplateError> {
    Ok(ArgumentTemplate::parse(params)?.render(input, output, overwrite))
}

/// Builds the `Command` for one tool invocation.
#[must_use]
pub fn build_command(tool: &Path, args: &[OsString]) -> Command {
    let mut cmd = Command::new(tool);
    cmd.args(args);
    cmd
}

/// Shell-like rendering of an invocation, for display only.
#[must_use]
pub fn command_line(tool: &Path, args: &[OsString]) -> String {
    std::iter::once(tool.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|part| {
            let text = part.to_string_lossy();
            if text.is_empty() || text.contains(char::is_whitespace) {
                format!("\"{text}\"")
            } else {
                text.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
