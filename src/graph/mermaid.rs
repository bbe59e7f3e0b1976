//! Mermaid flowchart rendering for resolved chains.
//!
//! Output is deterministic: nodes in chain order, edges in chain order
//! with capability labels sorted.

use std::collections::BTreeSet;

use crate::catalog::Skill;

/// Render a resolved chain as a mermaid `flowchart TD`.
///
/// Each chain skill becomes a node labeled `name (risk/cost)`; an edge is
/// drawn for every intra-chain capability dependency. With
/// `with_capabilities`, capabilities become their own ellipse nodes between
/// provider and requirer.
#[must_use]
pub fn render(chain: &[String], skills: &[Skill], with_capabilities: bool) -> String {
    let mut out = String::from("flowchart TD\n");

    let in_chain = |name: &str| chain.iter().any(|c| c == name);
    let find = |name: &str| skills.iter().find(|s| s.name == name);

    for name in chain {
        let Some(skill) = find(name) else { continue };
        let risk = format!("{:?}", skill.risk).to_lowercase();
        let cost = format!("{:?}", skill.cost).to_lowercase();
        out.push_str(&format!(
            "    {}[\"{} ({risk}/{cost})\"]\n",
            node_id(name),
            skill.name
        ));
    }

    if with_capabilities {
        let mut cap_nodes: BTreeSet<String> = BTreeSet::new();
        let mut lines: Vec<String> = Vec::new();
        for name in chain {
            let Some(skill) = find(name) else { continue };
            let mut caps: Vec<&String> = skill.provides.iter().collect();
            caps.sort();
            for cap in caps {
                // Only draw capabilities some chain member consumes.
                let consumed = chain.iter().any(|other| {
                    other != name
                        && find(other).is_some_and(|s| s.requires.iter().any(|r| r == cap))
                });
                if !consumed {
                    continue;
                }
                cap_nodes.insert(cap.clone());
                lines.push(format!("    {} --> {}\n", node_id(name), cap_id(cap)));
                for other in chain {
                    if other != name
                        && find(other).is_some_and(|s| s.requires.iter().any(|r| r == cap))
                    {
                        lines.push(format!("    {} --> {}\n", cap_id(cap), node_id(other)));
                    }
                }
            }
        }
        for cap in &cap_nodes {
            out.push_str(&format!("    {}([\"{cap}\"])\n", cap_id(cap)));
        }
        for line in lines {
            out.push_str(&line);
        }
    } else {
        for name in chain {
            let Some(skill) = find(name) else { continue };
            let mut caps: Vec<&String> = skill.provides.iter().collect();
            caps.sort();
            for cap in caps {
                for other in chain {
                    if other == name || !in_chain(other) {
                        continue;
                    }
                    if find(other).is_some_and(|s| s.requires.iter().any(|r| r == cap)) {
                        out.push_str(&format!(
                            "    {} -->|{cap}| {}\n",
                            node_id(name),
                            node_id(other)
                        ));
                    }
                }
            }
        }
    }

    out
}

fn node_id(name: &str) -> String {
    sanitize(name)
}

fn cap_id(capability: &str) -> String {
    format!("cap_{}", sanitize(capability))
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
