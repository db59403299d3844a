use anyhow::Result;
use serde_json::json;
use termitheme::BackendRegistry;

/// Print profile names one per line.
pub(crate) fn print_plain(names: &[String]) {
    for name in names {
        println!("{name}");
    }
}

/// Format a terminal's profile names as a JSON document.
pub(crate) fn format_profiles_json(terminal: &str, names: &[String]) -> Result<String> {
    let payload = json!({
        "terminal": terminal,
        "profiles": names,
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}

pub(crate) fn print_json(terminal: &str, names: &[String]) -> Result<()> {
    println!("{}", format_profiles_json(terminal, names)?);
    Ok(())
}

/// One line per known terminal type, marking those unusable here.
pub(crate) fn terminal_lines(registry: &BackendRegistry) -> Vec<String> {
    registry
        .descriptors()
        .map(|(descriptor, available)| {
            let note = if available { "" } else { " (unavailable)" };
            format!("{:<8}{}{note}", descriptor.name, descriptor.label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn json_format_lists_profiles() {
        let names = vec!["Default".to_string(), "Night".to_string()];
        let json = format_profiles_json("gnome", &names).expect("json");
        let value: Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["terminal"], "gnome");
        assert_eq!(value["profiles"][1], "Night");
    }

    #[test]
    fn every_built_in_terminal_is_listed() {
        let lines = terminal_lines(BackendRegistry::detect());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("gnome"));
        assert!(lines[1].starts_with("putty"));
    }
}
