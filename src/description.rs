use crate::contacts::ContactSource;
use crate::types::{ContactRecord, EventRecord};
use std::fmt::Write;

/// Render the human-readable description block for one event: a header
/// naming the billing, the main artist's contact, then a contact line
/// for every other lineup member. Pure and deterministic.
pub fn compose(event: &EventRecord, contacts: &dyn ContactSource) -> String {
    let mut out = String::new();

    let lineup = if event.full_lineup.trim().is_empty() {
        event.main_artist.as_str()
    } else {
        event.full_lineup.as_str()
    };
    let _ = writeln!(out, "Main artist: {}", event.main_artist);
    let _ = writeln!(out, "Full lineup: {}", lineup);

    let _ = writeln!(out, "\nMain artist contact:");
    let _ = write!(out, "{}", contact_block(&contacts.resolve(&event.main_artist)));

    let others = event.other_lineup_members();
    if !others.is_empty() {
        let _ = writeln!(out, "\nOther lineup contacts:");
        for name in others {
            let _ = write!(out, "{}", contact_block(&contacts.resolve(name)));
        }
    }

    out
}

fn contact_block(contact: &ContactRecord) -> String {
    format!(
        "  {}: manager {}, email {}, phone {}\n",
        contact.artist, contact.manager, contact.email, contact.phone
    )
}
