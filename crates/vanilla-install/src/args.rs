use std::collections::{HashMap, HashSet};

use crate::manifest::{ArgValue, Argument, Rule, VersionData};

/// Expands the version's JVM and game argument templates. Legacy versions
/// only carry `minecraftArguments`, so their JVM list comes back empty.
pub fn build_arguments(
    version: &VersionData,
    replacements: &HashMap<&str, String>,
) -> Result<(Vec<String>, Vec<String>), String> {
    if let Some(arguments) = &version.arguments {
        let jvm = expand_args(&arguments.jvm, replacements);
        let game = expand_args(&arguments.game, replacements);
        return Ok((jvm, game));
    }

    let raw = version
        .minecraft_arguments
        .as_deref()
        .ok_or_else(|| format!("Version {} has no launch arguments", version.id))?;
    let game = raw
        .split_whitespace()
        .map(|arg| replace_tokens(arg, replacements))
        .collect();

    Ok((Vec::new(), game))
}

pub fn unresolved_tokens(args: &[String]) -> Vec<String> {
    let mut out = HashSet::new();
    for arg in args {
        out.extend(extract_tokens(arg));
    }
    let mut values = out.into_iter().collect::<Vec<_>>();
    values.sort();
    values
}

fn expand_args(args: &[Argument], replacements: &HashMap<&str, String>) -> Vec<String> {
    let mut expanded = Vec::new();
    for arg in args {
        match arg {
            Argument::String(value) => expanded.push(replace_tokens(value, replacements)),
            Argument::Rule { rules, value } => {
                if !rules_allow(Some(rules)) {
                    continue;
                }
                match value {
                    ArgValue::String(value) => expanded.push(replace_tokens(value, replacements)),
                    ArgValue::List(list) => {
                        expanded.extend(list.iter().map(|item| replace_tokens(item, replacements)))
                    }
                }
            }
        }
    }
    expanded
}

fn replace_tokens(input: &str, replacements: &HashMap<&str, String>) -> String {
    let mut cursor = 0usize;
    let mut output = String::new();
    while let Some(start_rel) = input[cursor..].find("${") {
        let start = cursor + start_rel;
        output.push_str(&input[cursor..start]);

        let token_start = start + 2;
        let Some(end_rel) = input[token_start..].find('}') else {
            output.push_str(&input[start..]);
            cursor = input.len();
            break;
        };
        let end = token_start + end_rel;
        let key = &input[token_start..end];
        match replacements.get(key) {
            Some(value) => output.push_str(value),
            None => output.push_str(&input[start..=end]),
        }
        cursor = end + 1;
    }
    if cursor < input.len() {
        output.push_str(&input[cursor..]);
    }
    output
}

fn extract_tokens(input: &str) -> Vec<String> {
    let mut cursor = 0usize;
    let mut tokens = Vec::new();
    while let Some(start_rel) = input[cursor..].find("${") {
        let start = cursor + start_rel + 2;
        let Some(end_rel) = input[start..].find('}') else {
            break;
        };
        let end = start + end_rel;
        if end > start {
            tokens.push(input[start..end].to_string());
        }
        cursor = end + 1;
    }
    tokens
}

/// Mojang rule evaluation: the last applicable rule decides, and no rules
/// means allowed.
pub fn rules_allow(rules: Option<&[Rule]>) -> bool {
    let Some(rules) = rules else {
        return true;
    };

    let mut allowed = false;
    for rule in rules {
        let os_applies = rule
            .os
            .as_ref()
            .and_then(|os| os.name.as_deref())
            .map(|name| name == current_os_key())
            .unwrap_or(true);

        if os_applies && features_match(rule.features.as_ref()) {
            allowed = rule.action == "allow";
        }
    }
    allowed
}

// Demo mode, custom resolution and quick play are never requested.
fn features_match(features: Option<&HashMap<String, bool>>) -> bool {
    let Some(features) = features else {
        return true;
    };
    features.values().all(|expected| !expected)
}

pub fn current_os_key() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

pub fn current_arch() -> &'static str {
    if cfg!(target_arch = "x86") {
        "32"
    } else if cfg!(target_arch = "aarch64") {
        "arm64"
    } else {
        "64"
    }
}

pub fn classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}
