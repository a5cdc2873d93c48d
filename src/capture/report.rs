use super::{GitStatus, Report, remote_hint};
use crate::audio::Playback;
use crate::git::SyncOutcome;
use crate::lang::Detection;

pub fn format_detection(detection: &Detection) -> String {
    match detection.confidence {
        Some(confidence) => format!(
            "{} ({}, confidence {confidence:.2})",
            detection.code,
            detection.source.label()
        ),
        None => format!("{} ({})", detection.code, detection.source.label()),
    }
}

pub fn format_report(report: &Report) -> String {
    let lookup = &report.lookup;
    let mut output = format!(
        "Saved (TSV):\n{}\nFile: {}\n",
        report.row,
        report.deck_file.display()
    );

    if let Some(detection) = &lookup.detection {
        output.push_str(&format!("Language: {}\n", format_detection(detection)));
    }
    if let Some(phonetic) = &lookup.phonetic {
        output.push_str(&format!("Phonetic: {phonetic}\n"));
    }
    match (&lookup.audio_url, &lookup.pronunciation) {
        (Some(_), Some(p)) => {
            let by = [p.username.as_deref(), p.country.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(", ");
            if by.is_empty() {
                output.push_str(&format!("Audio: {} (Forvo)\n", p.mp3_url));
            } else {
                output.push_str(&format!("Audio: {} (Forvo: {by})\n", p.mp3_url));
            }
        }
        (Some(url), None) => output.push_str(&format!("Audio: {url}\n")),
        _ => {}
    }
    match &report.playback {
        Playback::Streamed(player) => {
            output.push_str(&format!("Playback: {}\n", player.program()));
        }
        Playback::Spoken { voice } => {
            output.push_str(&format!("Playback: espeak-ng ({voice})\n"));
        }
        Playback::Failed => output.push_str("Playback: no audio player could be started\n"),
        Playback::Disabled => {}
    }
    if report.git == GitStatus::Synced(SyncOutcome::Pushed) {
        output.push_str("Git: committed and pushed\n");
    }

    if !lookup.notes.is_empty() {
        output.push_str("\nNotes:\n");
        for note in &lookup.notes {
            output.push_str(&format!("- {note}\n"));
        }
    }

    if let Some(hint) = remote_hint(report) {
        output.push('\n');
        output.push_str(&hint);
        output.push('\n');
    }

    output
}
