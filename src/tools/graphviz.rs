//! Graphviz: installation status and node layout
//!
//! The face pairing graph is laid out by `neato` (or `dot`) in `-Tplain`
//! mode. The plain format gives node coordinates in inches, which the
//! graph tab scales onto a terminal canvas.

use super::{resolve_executable, run_captured, ToolError};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

const RUN_TIMEOUT: Duration = Duration::from_secs(10);

/// What we learned about a Graphviz executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphvizStatus {
    NotFound,
    NotExist,
    NotExecutable,
    NotStartable,
    /// Ran, but did not report a version we recognise
    Unsupported,
    /// Graphviz 1.x, whose tools other than `dot` mishandle multiple edges
    Version1NotDot,
    Version1,
    Version2OrLater,
}

impl GraphvizStatus {
    pub fn usable(&self) -> bool {
        matches!(self, Self::Version1 | Self::Version2OrLater)
    }

    /// Explanation shown in place of the graph when unusable
    pub fn diagnostic(&self, executable: &str) -> String {
        let header = "Graphviz is used to display face pairing graphs. ";
        let footer = " You can install Graphviz from www.graphviz.org. If it is already \
                      installed, set [graphviz] executable in the config file.";
        let error = match self {
            Self::NotFound => format!(
                "However, I could not find the Graphviz executable \"{executable}\" on \
                 the default search path."
            ),
            Self::NotExist => {
                format!("However, the Graphviz executable \"{executable}\" does not exist.")
            }
            Self::NotExecutable => format!(
                "However, the Graphviz executable \"{executable}\" does not appear to be \
                 an executable file."
            ),
            Self::NotStartable => {
                format!("However, I could not start the Graphviz executable \"{executable}\".")
            }
            Self::Unsupported => format!(
                "However, I cannot determine the version of Graphviz that you are \
                 running. Perhaps your Graphviz is too old (version 0.x), or perhaps \
                 \"{executable}\" is not from Graphviz at all."
            ),
            Self::Version1NotDot => "Your Graphviz seems to be very old (version 1.x). \
                 Many tools in older versions of Graphviz cannot handle multiple edges, \
                 including neato. You will need to change your Graphviz executable to \
                 dot, which handles multiple edges correctly even in this old version."
                .to_string(),
            Self::Version1 | Self::Version2OrLater => return String::new(),
        };
        format!("{header}{error}{footer}")
    }
}

/// Classify the output of `<exe> -V`
pub fn classify_version(output: &str, program: &Path) -> GraphvizStatus {
    static VERSION: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = VERSION
        .get_or_init(|| Regex::new(r"version\s+(\d+)\.").ok())
        .as_ref()
    else {
        return GraphvizStatus::Unsupported;
    };

    let Some(major) = re
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
    else {
        return GraphvizStatus::Unsupported;
    };

    match major {
        0 => GraphvizStatus::Unsupported,
        1 => {
            let is_dot = program
                .file_stem()
                .is_some_and(|s| s.eq_ignore_ascii_case("dot"));
            if is_dot {
                GraphvizStatus::Version1
            } else {
                GraphvizStatus::Version1NotDot
            }
        }
        _ => GraphvizStatus::Version2OrLater,
    }
}

type StatusCache = Mutex<HashMap<String, (GraphvizStatus, Option<PathBuf>)>>;

/// Status of the configured executable, cached per configured name
pub fn status(executable: &str) -> (GraphvizStatus, Option<PathBuf>) {
    static CACHE: OnceLock<StatusCache> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    if let Some(hit) = cache
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(executable)
    {
        return hit.clone();
    }

    let result = probe(executable);
    tracing::debug!("Graphviz status for {:?}: {:?}", executable, result.0);
    cache
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(executable.to_string(), result.clone());
    result
}

fn probe(executable: &str) -> (GraphvizStatus, Option<PathBuf>) {
    let path = match resolve_executable(executable) {
        Ok(path) => path,
        Err(ToolError::NotFound { .. }) => return (GraphvizStatus::NotFound, None),
        Err(ToolError::NotExist { .. }) => return (GraphvizStatus::NotExist, None),
        Err(_) => return (GraphvizStatus::NotExecutable, None),
    };
    match run_captured(&path, &["-V".to_string()], None, RUN_TIMEOUT) {
        // Graphviz prints its version banner on stderr.
        Ok(out) => {
            let banner = format!("{}{}", out.stderr, out.stdout);
            (classify_version(&banner, &path), Some(path))
        }
        Err(_) => (GraphvizStatus::NotStartable, Some(path)),
    }
}

/// A node position from `-Tplain` output
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub name: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// A laid-out graph, coordinates in inches with the origin bottom-left
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
    /// Edges as indices into `nodes`
    pub edges: Vec<(usize, usize)>,
}

/// Split a plain-format line into words, honouring double quotes
fn tokenize(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Parse Graphviz `-Tplain` output
pub fn parse_plain(text: &str) -> Result<Layout, String> {
    let mut layout = Layout::default();
    let mut index: HashMap<String, usize> = HashMap::new();
    let number = |s: Option<&String>| -> Result<f64, String> {
        s.ok_or_else(|| "truncated line".to_string())?
            .parse::<f64>()
            .map_err(|e| e.to_string())
    };

    for line in text.lines() {
        let words = tokenize(line);
        match words.first().map(String::as_str) {
            Some("graph") => {
                layout.width = number(words.get(2))?;
                layout.height = number(words.get(3))?;
            }
            Some("node") => {
                let name = words.get(1).ok_or("node without a name")?.clone();
                let node = LayoutNode {
                    label: words.get(6).cloned().unwrap_or_else(|| name.clone()),
                    x: number(words.get(2))?,
                    y: number(words.get(3))?,
                    name: name.clone(),
                };
                index.insert(name, layout.nodes.len());
                layout.nodes.push(node);
            }
            Some("edge") => {
                let tail = words.get(1).and_then(|n| index.get(n));
                let head = words.get(2).and_then(|n| index.get(n));
                match (tail, head) {
                    (Some(&t), Some(&h)) => layout.edges.push((t, h)),
                    _ => return Err(format!("edge refers to an unknown node: {line}")),
                }
            }
            Some("stop") => break,
            _ => {}
        }
    }
    if layout.nodes.is_empty() && layout.width == 0.0 {
        return Err("no graph in output".to_string());
    }
    Ok(layout)
}

/// Lay out a DOT graph with the given Graphviz executable
pub fn layout(program: &Path, dot: &str) -> Result<Layout, ToolError> {
    let dot_file = tempfile::Builder::new()
        .prefix("regina-")
        .suffix(".dot")
        .tempfile()?;
    std::fs::write(dot_file.path(), dot)?;

    let args = vec!["-Tplain".to_string(), dot_file.path().display().to_string()];
    let out = run_captured(program, &args, None, RUN_TIMEOUT)?;
    let command = super::command_line(program, &args);
    if out.exit_code != Some(0) {
        return Err(ToolError::Failed {
            command,
            exit_code: out.exit_code,
            stderr: out.stderr,
        });
    }
    parse_plain(&out.stdout).map_err(|detail| ToolError::BadOutput { command, detail })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_version() {
        let neato = Path::new("/usr/bin/neato");
        let dot = Path::new("/usr/bin/dot");
        assert_eq!(
            classify_version("neato - graphviz version 2.43.0 (0)", neato),
            GraphvizStatus::Version2OrLater
        );
        assert_eq!(
            classify_version("neato version 1.13 (v16)", neato),
            GraphvizStatus::Version1NotDot
        );
        assert_eq!(
            classify_version("dot version 1.13 (v16)", dot),
            GraphvizStatus::Version1
        );
        assert_eq!(
            classify_version("something else entirely", neato),
            GraphvizStatus::Unsupported
        );
    }

    #[test]
    fn test_diagnostics_are_distinct() {
        let statuses = [
            GraphvizStatus::NotFound,
            GraphvizStatus::NotExecutable,
            GraphvizStatus::NotStartable,
            GraphvizStatus::Unsupported,
            GraphvizStatus::Version1NotDot,
        ];
        let messages: std::collections::HashSet<String> =
            statuses.iter().map(|s| s.diagnostic("neato")).collect();
        assert_eq!(messages.len(), statuses.len());
        assert!(GraphvizStatus::Version2OrLater.diagnostic("neato").is_empty());
    }

    #[test]
    fn test_parse_plain() {
        let text = "graph 1 2.5 1.75\n\
                    node g_0 0.5 0.5 0.15 0.15 \"0\" filled circle black lightgrey\n\
                    node g_1 2 1.25 0.15 0.15 \"1\" filled circle black lightgrey\n\
                    edge g_0 g_1 4 0.5 0.5 1 0.8 1.5 1 2 1.25 solid black\n\
                    edge g_1 g_0 4 2 1.25 1.5 1 1 0.8 0.5 0.5 solid black\n\
                    stop\n";
        let layout = parse_plain(text).expect("valid plain output");
        assert_eq!(layout.width, 2.5);
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.nodes[1].label, "1");
        assert_eq!(layout.nodes[1].x, 2.0);
        assert_eq!(layout.edges, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_parse_plain_rejects_unknown_nodes() {
        let text = "graph 1 1 1\nnode a 0 0 1 1 a\nedge a b 0 solid black\nstop\n";
        assert!(parse_plain(text).is_err());
    }

    #[test]
    fn test_missing_executable_status() {
        let (status, path) = status("no-such-graphviz-binary-xyz");
        assert_eq!(status, GraphvizStatus::NotFound);
        assert!(path.is_none());
    }
}
