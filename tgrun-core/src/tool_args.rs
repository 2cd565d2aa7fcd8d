// ============================================================================
// tgrun-core/src/tool_args.rs
// ============================================================================
//
// TOOL ARGUMENTS: Command lines for the tool's subcommands
//
// The tool exposes two subcommands:
//
//   convert -i INPUT [-o OUTPUT] [EXTRA...]
//   spoof INPUT OUTPUT [EXTRA...]
//
// Extra arguments are entered as one free-form string and split with POSIX
// shell rules (the shlex crate) before being appended verbatim. Paths must be
// valid UTF-8; the tool would otherwise receive a different file name.

// ---- Standard library imports ----
use std::fmt;
use std::path::{Path, PathBuf};

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

/// The tool subcommand a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Convert,
    Spoof,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Convert => "convert",
            Operation::Spoof => "spoof",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments for `convert`. Without an output the tool picks one itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub extra: Vec<String>,
}

impl ConvertArgs {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            extra: Vec::new(),
        }
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Splits `extra` with [`split_extra_args`] and stores the result.
    pub fn extra(mut self, extra: &str) -> CoreResult<Self> {
        self.extra = split_extra_args(extra)?;
        Ok(self)
    }

    pub fn to_args(&self) -> CoreResult<Vec<String>> {
        let mut args = vec![
            Operation::Convert.as_str().to_string(),
            "-i".to_string(),
            path_arg(&self.input)?,
        ];
        if let Some(output) = &self.output {
            args.push("-o".to_string());
            args.push(path_arg(output)?);
        }
        args.extend(self.extra.iter().cloned());
        Ok(args)
    }

    pub fn validate(&self) -> CoreResult<()> {
        ensure_input_exists(&self.input)
    }
}

/// Arguments for `spoof`. Both paths are positional and required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoofArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub extra: Vec<String>,
}

impl SpoofArgs {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            extra: Vec::new(),
        }
    }

    pub fn extra(mut self, extra: &str) -> CoreResult<Self> {
        self.extra = split_extra_args(extra)?;
        Ok(self)
    }

    pub fn to_args(&self) -> CoreResult<Vec<String>> {
        let mut args = vec![
            Operation::Spoof.as_str().to_string(),
            path_arg(&self.input)?,
            path_arg(&self.output)?,
        ];
        args.extend(self.extra.iter().cloned());
        Ok(args)
    }

    pub fn validate(&self) -> CoreResult<()> {
        ensure_input_exists(&self.input)
    }
}

fn path_arg(path: &Path) -> CoreResult<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        CoreError::InvalidArguments(format!("path is not valid UTF-8: {}", path.display()))
    })
}

fn ensure_input_exists(input: &Path) -> CoreResult<()> {
    if input.is_file() {
        Ok(())
    } else {
        Err(CoreError::InputNotFound(input.to_path_buf()))
    }
}

/// Splits a free-form argument string the way a POSIX shell would.
///
/// Single quotes are literal, double quotes honour backslash escapes, words
/// are separated by spaces, tabs and newlines, and a word starting with `#`
/// begins a comment. Blank input yields no arguments.
pub fn split_extra_args(input: &str) -> CoreResult<Vec<String>> {
    shlex::split(input).ok_or_else(|| {
        CoreError::InvalidArguments(format!(
            "unterminated quote or trailing backslash in extra arguments: {input}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_args_shape() {
        let args = ConvertArgs::new("clip.mp4").to_args().unwrap();
        assert_eq!(args, ["convert", "-i", "clip.mp4"]);

        let args = ConvertArgs::new("clip.mp4")
            .output("out.webm")
            .extra("--fps 30")
            .unwrap()
            .to_args()
            .unwrap();
        assert_eq!(args, ["convert", "-i", "clip.mp4", "-o", "out.webm", "--fps", "30"]);
    }

    #[test]
    fn spoof_args_shape() {
        let args = SpoofArgs::new("in.webm", "out.webm")
            .extra("--verbose")
            .unwrap()
            .to_args()
            .unwrap();
        assert_eq!(args, ["spoof", "in.webm", "out.webm", "--verbose"]);
    }

    #[test]
    fn split_handles_quotes_and_escapes() {
        assert_eq!(split_extra_args("").unwrap(), Vec::<String>::new());
        assert_eq!(split_extra_args("   ").unwrap(), Vec::<String>::new());
        assert_eq!(
            split_extra_args(r#"--title "my sticker" --tag 'a b'"#).unwrap(),
            ["--title", "my sticker", "--tag", "a b"]
        );
        assert_eq!(split_extra_args(r"a\ b c").unwrap(), ["a b", "c"]);
        assert_eq!(split_extra_args(r#""say \"hi\"""#).unwrap(), [r#"say "hi""#]);
        assert_eq!(split_extra_args(r#"'it'"'"'s'"#).unwrap(), ["it's"]);
        assert_eq!(split_extra_args("'' x").unwrap(), ["", "x"]);
        assert_eq!(split_extra_args(r#""a\n""#).unwrap(), [r"a\n"]);
    }

    #[test]
    fn split_only_breaks_on_shell_whitespace() {
        assert_eq!(split_extra_args("a\tb\nc").unwrap(), ["a", "b", "c"]);
        assert_eq!(split_extra_args("--title a\u{a0}b").unwrap(), ["--title", "a\u{a0}b"]);
    }

    #[test]
    fn split_rejects_unterminated_input() {
        assert!(matches!(
            split_extra_args("--title 'oops"),
            Err(CoreError::InvalidArguments(_))
        ));
        assert!(matches!(
            split_extra_args("\"half"),
            Err(CoreError::InvalidArguments(_))
        ));
        assert!(matches!(
            split_extra_args("trailing\\"),
            Err(CoreError::InvalidArguments(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = PathBuf::from(OsStr::from_bytes(b"clip\xff.mp4"));
        assert!(matches!(
            ConvertArgs::new(&input).to_args(),
            Err(CoreError::InvalidArguments(_))
        ));
        assert!(matches!(
            SpoofArgs::new("in.webm", &input).to_args(),
            Err(CoreError::InvalidArguments(_))
        ));
    }

    #[test]
    fn validate_requires_existing_input() {
        let missing = ConvertArgs::new("/definitely/not/here.mp4");
        assert!(matches!(missing.validate(), Err(CoreError::InputNotFound(_))));

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.webm");
        std::fs::write(&input, b"webm").unwrap();
        assert!(SpoofArgs::new(&input, dir.path().join("out.webm")).validate().is_ok());
    }
}
