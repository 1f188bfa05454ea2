//! Free-text intent classifier.
//!
//! Deterministic keyword matching: six phrase sets are tested in a fixed
//! priority order and the first set with a matching substring wins. There is
//! no scoring, so overlapping phrases ("turn the ...") always resolve to the
//! higher-priority action.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnOn,
    TurnOff,
    SetTemperature,
    GetStatus,
    Reboot,
    TakeSnapshot,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TurnOn => "turn_on",
            Action::TurnOff => "turn_off",
            Action::SetTemperature => "set_temperature",
            Action::GetStatus => "get_status",
            Action::Reboot => "reboot",
            Action::TakeSnapshot => "take_snapshot",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "turn_on" => Ok(Action::TurnOn),
            "turn_off" => Ok(Action::TurnOff),
            "set_temperature" => Ok(Action::SetTemperature),
            "get_status" => Ok(Action::GetStatus),
            "reboot" => Ok(Action::Reboot),
            "take_snapshot" => Ok(Action::TakeSnapshot),
            _ => Err(()),
        }
    }
}

// ── Phrase sets ───────────────────────────────────────────────────

const TURN_ON_PHRASES: &[&str] = &[
    "turn on", "switch on", "power on", "activate", "enable", "light up",
    "start", "boot up", "fire up", "initiate", "run", "begin", "wake up",
    "bring online", "turn my", "turn the", "switch my", "switch the",
    "make it on", "get it going", "launch", "kickstart", "ignite",
    "let there be light", "resume power", "switch it on", "turn this on",
    "plug in", "give power", "flip the switch", "power it up",
];

const TURN_OFF_PHRASES: &[&str] = &[
    "turn off", "switch off", "power off", "deactivate", "disable", "shut down",
    "stop", "cut off", "turn my", "turn the", "kill", "halt", "pause", "end",
    "put to sleep", "cut the power", "switch my", "switch the", "unplug",
    "remove power", "stop running", "power it down", "turn this off", "shut the",
    "flip the switch off", "dark mode", "kill the lights",
];

const SET_TEMPERATURE_PHRASES: &[&str] = &[
    "set temperature", "set thermostat", "change temperature", "adjust temperature",
    "temperature to", "thermostat to", "heat to", "cool to", "make it", "set it to",
    "increase temperature", "decrease temperature", "raise temp", "lower temp",
    "set degrees", "make it warmer", "make it colder", "chill to", "warm to",
    "set climate to", "adjust climate", "set ac to", "set heater to",
    "set the room temp", "bring temp to", "temp at", "set room to",
];

const STATUS_PHRASES: &[&str] = &[
    "status", "state", "is the", "check", "show", "tell me", "report",
    "how is", "current state", "what's the", "is my", "condition of", "give me status",
    "get status", "how's the", "is it working", "is it on", "is it off",
    "show me if", "are we online", "how's it going", "update me", "what's up with",
];

const REBOOT_PHRASES: &[&str] = &[
    "reboot", "restart", "reset", "power cycle", "reload", "re initialize",
    "refresh", "boot again", "turn it off and on", "cycle power", "re launch",
    "hard reset", "soft reset", "re kick", "system restart", "system reboot",
    "reset cam", "reset device", "reset this", "reboot this", "refresh the",
];

const SNAPSHOT_PHRASES: &[&str] = &[
    "snapshot", "picture", "photo", "image", "take a picture", "take photo",
    "capture", "grab image", "record still", "take snapshot", "show me the view",
    "take a shot", "snap a photo", "camera shot", "screen capture", "cam shot",
    "shoot", "snap it", "grab a frame", "freeze frame", "click a photo",
    "photograph", "take image", "see the camera", "view from", "what camera sees",
    "live view", "get me a shot", "look at camera", "show picture", "record image",
];

fn set_to_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bset .* to [0-9]{2}\b").expect("valid set-to pattern"))
}

fn temperature_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{2})\b").expect("valid temperature pattern"))
}

fn any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

fn is_turn_on(t: &str) -> bool {
    any_phrase(t, TURN_ON_PHRASES)
}

fn is_turn_off(t: &str) -> bool {
    any_phrase(t, TURN_OFF_PHRASES)
}

fn is_set_temperature(t: &str) -> bool {
    any_phrase(t, SET_TEMPERATURE_PHRASES) || set_to_pattern().is_match(t)
}

fn is_status(t: &str) -> bool {
    any_phrase(t, STATUS_PHRASES)
}

fn is_reboot(t: &str) -> bool {
    any_phrase(t, REBOOT_PHRASES)
}

fn is_snapshot(t: &str) -> bool {
    any_phrase(t, SNAPSHOT_PHRASES)
}

type Predicate = fn(&str) -> bool;

/// Ranked rule table; earlier entries win.
const RULES: &[(Predicate, Action)] = &[
    (is_turn_on, Action::TurnOn),
    (is_turn_off, Action::TurnOff),
    (is_set_temperature, Action::SetTemperature),
    (is_status, Action::GetStatus),
    (is_reboot, Action::Reboot),
    (is_snapshot, Action::TakeSnapshot),
];

/// Classifier output for one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    pub action: Action,
    /// Only populated for `SetTemperature`.
    pub temperature: Option<i64>,
}

/// Map a sentence to an action, or `None` if no phrase set matches.
pub fn classify(text: &str) -> Option<Action> {
    let t = text.trim().to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(&t))
        .map(|(_, action)| *action)
}

/// First two-digit number in the text.
pub fn extract_temperature(text: &str) -> Option<i64> {
    let t = text.to_lowercase();
    temperature_pattern()
        .captures(&t)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Classify and, for set-temperature, pull out the target value.
pub fn parse_intent(text: &str) -> Option<Intent> {
    let action = classify(text)?;
    let temperature = match action {
        Action::SetTemperature => extract_temperature(text),
        _ => None,
    };
    Some(Intent {
        action,
        temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── single-set phrases ────────────────────────────────────────

    #[test]
    fn turn_on_phrase() {
        assert_eq!(classify("turn on desk lamp"), Some(Action::TurnOn));
    }

    #[test]
    fn turn_off_phrase() {
        assert_eq!(classify("switch off coffee maker"), Some(Action::TurnOff));
    }

    #[test]
    fn set_temperature_phrase() {
        assert_eq!(classify("set thermostat to 24"), Some(Action::SetTemperature));
    }

    #[test]
    fn status_phrase() {
        assert_eq!(classify("what's the lamp doing"), Some(Action::GetStatus));
    }

    #[test]
    fn reboot_phrase() {
        assert_eq!(classify("reboot camera"), Some(Action::Reboot));
    }

    #[test]
    fn snapshot_phrase() {
        assert_eq!(classify("take a picture"), Some(Action::TakeSnapshot));
    }

    #[test]
    fn input_is_trimmed_and_lowercased() {
        assert_eq!(classify("   TURN ON Desk Lamp  "), Some(Action::TurnOn));
    }

    #[test]
    fn unrecognized_text_is_none() {
        assert_eq!(classify("hello there"), None);
        assert_eq!(classify(""), None);
    }

    // ── priority ──────────────────────────────────────────────────

    #[test]
    fn turn_on_beats_turn_off_on_shared_phrase() {
        // "turn the" sits in both sets
        assert_eq!(
            classify("turn the thermostat off and check status"),
            Some(Action::TurnOn)
        );
    }

    #[test]
    fn turn_off_beats_status() {
        assert_eq!(classify("shut down and report"), Some(Action::TurnOff));
    }

    #[test]
    fn status_beats_snapshot() {
        assert_eq!(classify("check the camera image"), Some(Action::GetStatus));
    }

    #[test]
    fn reboot_beats_snapshot() {
        assert_eq!(classify("reboot then snapshot"), Some(Action::Reboot));
    }

    #[test]
    fn set_to_pattern_fallback() {
        // no set-temperature phrase, only "set ... to NN"
        assert_eq!(classify("set bedroom to 19"), Some(Action::SetTemperature));
    }

    #[test]
    fn set_to_pattern_needs_two_digits() {
        assert_eq!(classify("set bedroom to 9"), None);
    }

    /// Two phrases per action, each matching only its own set, in rule order.
    const REPRESENTATIVES: &[(Action, &[&str])] = &[
        (Action::TurnOn, &["switch on the porch light", "power on the heater"]),
        (Action::TurnOff, &["power off the fan", "unplug the kettle"]),
        (Action::SetTemperature, &["change temperature please", "heat to 22"]),
        (Action::GetStatus, &["give me status", "how is the porch light"]),
        (Action::Reboot, &["reboot the router", "power cycle the hub"]),
        (Action::TakeSnapshot, &["grab a frame", "snap a photo"]),
    ];

    #[test]
    fn representatives_classify_alone() {
        for (action, phrases) in REPRESENTATIVES {
            for phrase in *phrases {
                assert_eq!(classify(phrase), Some(*action), "{phrase:?}");
            }
        }
    }

    #[test]
    fn higher_priority_set_wins_every_pair() {
        for (i, (winner, high)) in REPRESENTATIVES.iter().enumerate() {
            for (_, low) in &REPRESENTATIVES[i + 1..] {
                for a in *high {
                    for b in *low {
                        for text in [format!("{a} then {b}"), format!("{b} then {a}")] {
                            assert_eq!(classify(&text), Some(*winner), "{text:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn set_to_pattern_beats_lower_sets() {
        for text in [
            "set bedroom to 19 and report",
            "set bedroom to 19 then reboot",
            "set bedroom to 19 then grab a frame",
        ] {
            assert_eq!(classify(text), Some(Action::SetTemperature), "{text:?}");
        }
    }

    #[test]
    fn higher_sets_beat_set_to_pattern() {
        assert_eq!(
            classify("set bedroom to 19 and switch on the porch light"),
            Some(Action::TurnOn)
        );
        assert_eq!(
            classify("set bedroom to 19 and unplug the kettle"),
            Some(Action::TurnOff)
        );
    }

    // ── temperature extraction ────────────────────────────────────

    #[test]
    fn temperature_is_first_two_digit_number() {
        assert_eq!(extract_temperature("set thermostat to 24"), Some(24));
        assert_eq!(extract_temperature("between 18 and 22"), Some(18));
    }

    #[test]
    fn temperature_takes_trailing_digits_of_longer_number() {
        assert_eq!(extract_temperature("set it to 124"), Some(24));
    }

    #[test]
    fn temperature_absent() {
        assert_eq!(extract_temperature("make it warmer"), None);
    }

    #[test]
    fn parse_intent_fills_temperature_only_for_set_temperature() {
        let intent = parse_intent("set thermostat to 24").unwrap();
        assert_eq!(intent.action, Action::SetTemperature);
        assert_eq!(intent.temperature, Some(24));

        let intent = parse_intent("turn on lamp 42").unwrap();
        assert_eq!(intent.action, Action::TurnOn);
        assert_eq!(intent.temperature, None);
    }

    #[test]
    fn parse_intent_set_temperature_without_number() {
        let intent = parse_intent("make it warmer").unwrap();
        assert_eq!(intent.action, Action::SetTemperature);
        assert_eq!(intent.temperature, None);
    }

    #[test]
    fn action_round_trips_through_str() {
        for a in [
            Action::TurnOn,
            Action::TurnOff,
            Action::SetTemperature,
            Action::GetStatus,
            Action::Reboot,
            Action::TakeSnapshot,
        ] {
            assert_eq!(a.as_str().parse::<Action>(), Ok(a));
        }
        assert!("dance".parse::<Action>().is_err());
    }
}
