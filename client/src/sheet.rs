//! Read-only printable sign-in sheet, rendered from the mirror's snapshot.
//! Actors mark the paper copy; nothing here writes anywhere.

use crate::mirror::{CachedActor, CachedShow};

const RULE_WIDTH: usize = 56;

/// Renders a plain-text sheet for one show: a header line per the
/// organization's display title, the performance's date and time, and one
/// signature line per actor in roster order.
pub fn render_sign_in_sheet(
    title: &str,
    show: &CachedShow,
    actors: &[CachedActor],
) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    out.push_str(&rule);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&format!("Performance: {} at {}\n", show.date, show.show_time));
    out.push_str(&format!(
        "Roster as of: {}\n",
        show.synced_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&rule);
    out.push('\n');

    for actor in actors {
        out.push_str(&format!(
            "[ ]  {}, {}\n",
            actor.last_name, actor.first_name
        ));
    }

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("{} actors listed\n", actors.len()));
    out
}
