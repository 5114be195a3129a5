//! ASCII rendering of puzzle snapshots.

use strictly_hanoi::{Peg, PuzzleState};

const RULE_WIDTH: usize = 40;

/// Renders the towers side by side, smallest disks on top.
///
/// Each tower column is `2n + 1` characters wide. Disks are drawn as solid
/// bars centred on the pole, followed by a base and the peg labels.
pub fn render(state: &PuzzleState, goal: Peg) -> String {
    let n = state.num_disks() as usize;
    let mut out = String::new();

    out.push('\n');
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str(&format!(
        "Tower of Hanoi - {} disks - Moves: {}\n",
        state.num_disks(),
        state.moves()
    ));
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    for height in (1..=n).rev() {
        let row: Vec<String> = Peg::ALL
            .iter()
            .map(|peg| {
                let disks = state.disks(*peg);
                // `height` counts from the bottom of the stack.
                if disks.len() >= height {
                    let size = disks[disks.len() - height].size() as usize;
                    let padding = " ".repeat((n + 1).saturating_sub(size));
                    format!("{padding}{}{padding}", "█".repeat((2 * size).saturating_sub(1)))
                } else {
                    format!("{pad}|{pad}", pad = " ".repeat(n))
                }
            })
            .collect();
        out.push_str(&row.join("  "));
        out.push('\n');
    }

    let bases: Vec<String> = Peg::ALL.iter().map(|_| "▀".repeat(2 * n + 1)).collect();
    out.push_str(&bases.join("  "));
    out.push('\n');

    let labels: Vec<String> = Peg::ALL
        .iter()
        .map(|peg| format!("{pad}{peg}{pad}", pad = " ".repeat(n)))
        .collect();
    out.push_str(&labels.join("  "));
    out.push('\n');
    out.push_str(&format!("Goal: tower {goal}\n"));

    out
}
