//! Group simplification through GAP
//!
//! GAP reads a short script on stdin, simplifies the presentation with
//! `IsomorphismSimplifiedFpGroup` and prints the result one line at a time
//! as `gens: N` followed by `rel: [ 1, -2, ... ]` lines, where each integer
//! is a 1-based generator index with its sign as the exponent.

use super::{command_line, resolve_executable, run_captured, ToolError};
use crate::config::GapConfig;
use crate::packet::algebra::{GroupPresentation, Letter};
use std::time::Duration;

/// The GAP program that simplifies `group`
pub fn script(group: &GroupPresentation) -> String {
    let gen = |i: usize| format!("f.{}", i + 1);
    let relations: Vec<String> = group
        .relations
        .iter()
        .map(|rel| {
            rel.iter()
                .map(|&(g, exp)| format!("{}^{}", gen(g), exp))
                .collect::<Vec<_>>()
                .join("*")
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format!("f := FreeGroup({});\n", group.generators));
    out.push_str(&format!("g := f / [ {} ];\n", relations.join(", ")));
    out.push_str("h := Image(IsomorphismSimplifiedFpGroup(g));\n");
    out.push_str("Print(\"gens: \", Length(GeneratorsOfGroup(h)), \"\\n\");\n");
    out.push_str("for r in RelatorsOfFpGroup(h) do\n");
    out.push_str("  Print(\"rel: \", LetterRepAssocWord(r), \"\\n\");\n");
    out.push_str("od;\n");
    out.push_str("quit;\n");
    out
}

/// Parse GAP's answer back into a presentation
pub fn parse_output(text: &str) -> Result<GroupPresentation, String> {
    let mut generators = None;
    let mut relations = Vec::new();

    for line in text.lines().map(str::trim) {
        if let Some(count) = line.strip_prefix("gens:") {
            let count = count
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("bad generator count {count:?}: {e}"))?;
            generators = Some(count);
        } else if let Some(word) = line.strip_prefix("rel:") {
            let Some(count) = generators else {
                return Err("relation before generator count".to_string());
            };
            relations.push(parse_word(word, count)?);
        }
    }

    let generators = generators.ok_or("no generator count in output")?;
    let mut group = GroupPresentation {
        generators,
        relations,
    };
    group.reduce();
    Ok(group)
}

fn parse_word(word: &str, generators: usize) -> Result<Vec<Letter>, String> {
    let inner = word
        .trim()
        .strip_prefix('[')
        .and_then(|w| w.strip_suffix(']'))
        .ok_or_else(|| format!("relation is not a list: {word}"))?;
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let n = s
                .parse::<i64>()
                .map_err(|e| format!("bad letter {s:?}: {e}"))?;
            let index = n.unsigned_abs() as usize;
            if n == 0 || index > generators {
                return Err(format!("letter {n} is out of range"));
            }
            Ok((index - 1, if n > 0 { 1 } else { -1 }))
        })
        .collect()
}

/// Run GAP on `group` and return its simplified presentation
pub fn simplify(config: &GapConfig, group: &GroupPresentation) -> Result<GroupPresentation, ToolError> {
    let program = resolve_executable(&config.executable)?;
    let args = vec!["-q".to_string()];
    let timeout = Duration::from_secs(config.timeout_secs);
    let out = run_captured(&program, &args, Some(&script(group)), timeout)?;
    let command = command_line(&program, &args);

    if out.exit_code != Some(0) {
        return Err(ToolError::Failed {
            command,
            exit_code: out.exit_code,
            stderr: out.stderr,
        });
    }
    let simplified =
        parse_output(&out.stdout).map_err(|detail| ToolError::BadOutput { command, detail })?;
    tracing::info!(
        "GAP simplified {} generators to {}",
        group.generators,
        simplified.generators
    );
    Ok(simplified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_mentions_every_relation() {
        let group = GroupPresentation {
            generators: 2,
            relations: vec![vec![(0, 1), (1, -1)], vec![(1, 1), (1, 1)]],
        };
        let text = script(&group);
        assert!(text.contains("FreeGroup(2)"));
        assert!(text.contains("f.1^1*f.2^-1"));
        assert!(text.contains("f.2^1*f.2^1"));
        assert!(text.trim_end().ends_with("quit;"));
    }

    #[test]
    fn test_parse_output() {
        let group = parse_output("gens: 2\nrel: [ 1, 1, -2 ]\nrel: [ 2, 1, -2, -1 ]\n")
            .expect("valid output");
        assert_eq!(group.generators, 2);
        assert_eq!(group.relations[0], vec![(0, 1), (0, 1), (1, -1)]);
        assert_eq!(group.to_string(), "< a, b | a a b^-1, b a b^-1 a^-1 >");
    }

    #[test]
    fn test_parse_trivial_group() {
        let group = parse_output("gens: 0\n").expect("valid output");
        assert_eq!(group, GroupPresentation::default());
    }

    #[test]
    fn test_parse_rejects_out_of_range_letters() {
        assert!(parse_output("gens: 1\nrel: [ 2 ]\n").is_err());
        assert!(parse_output("rel: [ 1 ]\n").is_err());
        assert!(parse_output("garbage").is_err());
    }

    #[test]
    fn test_missing_gap_is_not_found() {
        let config = GapConfig {
            executable: "no-such-gap-binary-xyz".into(),
            ..GapConfig::default()
        };
        let err = simplify(&config, &GroupPresentation::default()).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }
}
