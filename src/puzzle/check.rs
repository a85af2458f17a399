use std::collections::BTreeSet;

use crate::mission::PuzzleParams;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Solved,
    Wrong { detail: String },
    /// The answer could not be read at all; this does not count as an attempt.
    Malformed { reason: String },
}

/// Checks a typed answer against the puzzle setup.
///
/// Answer formats:
/// - password: the password itself
/// - firewall: ports in knock order, e.g. `22, 443`
/// - network: node names in route order, e.g. `GW -> DMZ -> DB`
/// - malware: the sample name or its 1-based number
/// - phishing: 1-based numbers of every phishing message, any order
pub fn check_answer(params: &PuzzleParams, answer: &str) -> Verdict {
    let answer = answer.trim();
    if answer.is_empty() {
        return Verdict::Malformed {
            reason: "Type an answer before submitting.".to_string(),
        };
    }

    match params {
        PuzzleParams::Password { solution, .. } => {
            if answer == solution {
                Verdict::Solved
            } else {
                let detail = if answer.eq_ignore_ascii_case(solution) {
                    "Access denied. Passwords are case sensitive."
                } else {
                    "Access denied."
                };
                Verdict::Wrong {
                    detail: detail.to_string(),
                }
            }
        }
        PuzzleParams::Firewall { ports } => {
            let given = match parse_numbers::<u16>(answer) {
                Ok(given) => given,
                Err(token) => {
                    return Verdict::Malformed {
                        reason: format!("'{token}' is not a port number."),
                    }
                }
            };
            if &given == ports {
                return Verdict::Solved;
            }
            let correct_prefix = given
                .iter()
                .zip(ports)
                .take_while(|(a, b)| a == b)
                .count();
            Verdict::Wrong {
                detail: format!(
                    "Firewall reset after {} of {} knocks.",
                    correct_prefix,
                    ports.len()
                ),
            }
        }
        PuzzleParams::Network { nodes, path } => {
            let given: Vec<String> = split_tokens(answer)
                .map(|t| t.to_ascii_uppercase())
                .collect();
            if let Some(unknown) = given
                .iter()
                .find(|g| !nodes.iter().any(|n| n.eq_ignore_ascii_case(g)))
            {
                return Verdict::Malformed {
                    reason: format!("There is no node called '{unknown}'."),
                };
            }
            let expected: Vec<String> = path.iter().map(|n| n.to_ascii_uppercase()).collect();
            if given == expected {
                Verdict::Solved
            } else if given.first() != expected.first() {
                let detail = match path.first() {
                    Some(start) => format!("The probe must start at {start}."),
                    None => "This network has no route in.".to_string(),
                };
                Verdict::Wrong { detail }
            } else {
                Verdict::Wrong {
                    detail: "Probe detected and dropped en route.".to_string(),
                }
            }
        }
        PuzzleParams::Malware { samples, signature } => {
            let picked = match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= samples.len() => samples[n - 1].as_str(),
                Ok(n) => {
                    return Verdict::Malformed {
                        reason: format!("Pick a sample between 1 and {} (got {n}).", samples.len()),
                    }
                }
                Err(_) => answer,
            };
            if picked.eq_ignore_ascii_case(signature) {
                Verdict::Solved
            } else {
                Verdict::Wrong {
                    detail: format!("{picked} is clean."),
                }
            }
        }
        PuzzleParams::Phishing { messages, phishing } => {
            let given = match parse_numbers::<usize>(answer) {
                Ok(given) => given,
                Err(token) => {
                    return Verdict::Malformed {
                        reason: format!("'{token}' is not a message number."),
                    }
                }
            };
            if let Some(bad) = given.iter().find(|&&n| n == 0 || n > messages.len()) {
                return Verdict::Malformed {
                    reason: format!("There is no message {bad}."),
                };
            }
            let given: BTreeSet<usize> = given.into_iter().collect();
            let expected: BTreeSet<usize> = phishing.iter().copied().collect();
            if given == expected {
                Verdict::Solved
            } else {
                let missed = expected.difference(&given).count();
                let false_flags = given.difference(&expected).count();
                Verdict::Wrong {
                    detail: format!("{missed} phish missed, {false_flags} legitimate message(s) flagged."),
                }
            }
        }
    }
}

fn split_tokens(answer: &str) -> impl Iterator<Item = &str> {
    answer
        .split(|c: char| c == ',' || c == '>' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

/// Parses every token as a number, returning the first bad token on failure.
fn parse_numbers<T: std::str::FromStr>(answer: &str) -> Result<Vec<T>, String> {
    split_tokens(answer)
        .map(|t| t.parse::<T>().map_err(|_| t.to_string()))
        .collect()
}
