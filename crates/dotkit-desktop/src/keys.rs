//! Key sequences.
//!
//! Literal text is typed as-is; `<name>` tokens are keys, and `+` joins
//! keys into a chord: `<shift>+<insert>`, `<ctrl>+k`, `<up><up><enter>`.

use dotkit_core::{CommandSpec, DotkitError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStep {
    /// Text typed character by character.
    Type(String),
    /// A key or chord in xdotool keysym form, e.g. `shift+Insert`.
    Key(String),
}

fn keysym(name: &str) -> Result<String> {
    let lower = name.to_ascii_lowercase();
    let sym = match lower.as_str() {
        "shift" | "ctrl" | "alt" | "super" => lower.clone(),
        "insert" => "Insert".into(),
        "enter" | "return" => "Return".into(),
        "tab" => "Tab".into(),
        "escape" | "esc" => "Escape".into(),
        "backspace" => "BackSpace".into(),
        "delete" | "del" => "Delete".into(),
        "space" => "space".into(),
        "up" => "Up".into(),
        "down" => "Down".into(),
        "left" => "Left".into(),
        "right" => "Right".into(),
        "home" => "Home".into(),
        "end" => "End".into(),
        "page_up" | "pageup" => "Prior".into(),
        "page_down" | "pagedown" => "Next".into(),
        f if f.len() > 1 && f.starts_with('f') && f[1..].parse::<u8>().is_ok_and(|n| (1..=12).contains(&n)) => {
            f.to_ascii_uppercase()
        }
        _ => return Err(DotkitError::InvalidInput(format!("unknown key <{name}>"))),
    };
    Ok(sym)
}

/// Read `<name>` starting at `chars[i] == '<'`; returns the name and the
/// index after `>`, or `None` when the bracket is not closed.
fn token(chars: &[char], i: usize) -> Option<(String, usize)> {
    let close = chars[i + 1..].iter().position(|c| *c == '>')? + i + 1;
    let name: String = chars[i + 1..close].iter().collect();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, close + 1))
}

pub fn parse_key_sequence(input: &str) -> Result<Vec<KeyStep>> {
    let chars: Vec<char> = input.chars().collect();
    let mut steps = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let Some((name, mut next)) = (chars[i] == '<').then(|| token(&chars, i)).flatten() else {
            text.push(chars[i]);
            i += 1;
            continue;
        };

        if !text.is_empty() {
            steps.push(KeyStep::Type(std::mem::take(&mut text)));
        }
        let mut chord = vec![keysym(&name)?];
        while next < chars.len() && chars[next] == '+' && next + 1 < chars.len() {
            if chars[next + 1] == '<' {
                let (name, after) = token(&chars, next + 1)
                    .ok_or_else(|| DotkitError::InvalidInput(format!("unclosed key in '{input}'")))?;
                chord.push(keysym(&name)?);
                next = after;
            } else {
                chord.push(chars[next + 1].to_string());
                next += 2;
            }
        }
        steps.push(KeyStep::Key(chord.join("+")));
        i = next;
    }

    if !text.is_empty() {
        steps.push(KeyStep::Type(text));
    }
    Ok(steps)
}

/// xdotool invocations for a parsed sequence; runs of keys share one call.
pub fn xdotool_commands(steps: &[KeyStep]) -> Vec<CommandSpec> {
    fn flush(keys: &mut Vec<&str>, commands: &mut Vec<CommandSpec>) {
        if !keys.is_empty() {
            commands.push(CommandSpec::new("xdotool").arg("key").args(keys.drain(..)));
        }
    }

    let mut commands: Vec<CommandSpec> = Vec::new();
    let mut pending_keys: Vec<&str> = Vec::new();

    for step in steps {
        match step {
            KeyStep::Key(k) => pending_keys.push(k),
            KeyStep::Type(t) => {
                flush(&mut pending_keys, &mut commands);
                commands.push(CommandSpec::new("xdotool").args(["type", "--", t.as_str()]));
            }
        }
    }
    flush(&mut pending_keys, &mut commands);
    commands
}
