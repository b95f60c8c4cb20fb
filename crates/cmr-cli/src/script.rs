//! Script lines: tokenizing and parsing into [`Step`]s.

use anyhow::bail;
use clap::{Parser, Subcommand};
use cmr_types::VersioningState;

#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    step: Step,
}

/// One repository command.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Step {
    /// Act as another principal
    User { name: String },
    /// Create a folder
    Mkdir { path: String },
    /// Create a document
    Put {
        path: String,
        /// Text content
        content: Option<String>,
        #[arg(short, long = "type", default_value = "cmis:document")]
        type_id: String,
        /// none, major, minor or checkedout
        #[arg(short, long)]
        state: Option<VersioningState>,
        #[arg(long, default_value = "text/plain")]
        mime: String,
    },
    /// List a folder
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Show a folder subtree
    Tree {
        #[arg(default_value = "/")]
        path: String,
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Print document content
    Cat { path: String },
    /// Move an object into another folder
    Mv { path: String, target: String },
    Rename { path: String, name: String },
    /// File a document in an additional folder
    Link { path: String, folder: String },
    /// Remove a document from one of its folders
    Unlink { path: String, folder: String },
    /// Delete an object
    Rm {
        path: String,
        #[arg(long)]
        all_versions: bool,
    },
    /// Delete a folder and everything below it
    Rmtree {
        path: String,
        #[arg(long = "continue")]
        continue_on_failure: bool,
    },
    Checkout { path: String },
    Cancel { path: String },
    Checkin {
        path: String,
        #[arg(long)]
        major: bool,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long)]
        message: Option<String>,
    },
    Versions { path: String },
    Actions { path: String },
    Props { path: String },
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Step>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let tokens = tokenize(line)?;
    let parsed = Line::try_parse_from(tokens)?;
    Ok(Some(parsed.step))
}

/// Split on whitespace, honoring double quotes and backslash escapes.
pub fn tokenize(line: &str) -> anyhow::Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    current.push(next);
                    in_token = true;
                }
                None => bail!("dangling escape at end of line"),
            },
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quoted {
        bail!("unterminated quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
