//! Sanitizing of debugger output before display.
//!
//! OpenOCD's console and process output are aimed at terminals: lines end in
//! `\r\n`, progress updates rewrite themselves with bare carriage returns,
//! and some builds colour their prompts with ANSI escape sequences. On top of
//! that, the telnet console opens with a burst of IAC option-negotiation
//! bytes, because the server assumes it is talking to a real telnet client.
//!
//! None of that belongs in the transcript the user reads, so everything
//! passes through here first: [`strip_telnet_iac`] on the raw socket bytes,
//! then [`sanitize`] on the decoded text.

/// Telnet command escape byte.
const IAC: u8 = 255;
/// Start of option subnegotiation (`IAC SB ... IAC SE`).
const SB: u8 = 250;
/// End of option subnegotiation.
const SE: u8 = 240;
/// First of the four option verbs WILL/WONT/DO/DONT.
const WILL: u8 = 251;
const DONT: u8 = 254;

/// Removes carriage returns and ANSI CSI escape sequences from `text`.
///
/// A CSI sequence is `ESC [` followed by parameter bytes (digits and `;`)
/// and a final letter, e.g. `\x1b[0;32m`. Anything else is passed through
/// unchanged.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {}
            '\x1b' if chars.peek() == Some(&'[') => {
                chars.next();
                // Consume parameter bytes up to and including the final letter.
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Removes telnet IAC command sequences from a raw byte stream.
///
/// Handles the three shapes a server can send:
/// - `IAC IAC` – an escaped literal `0xFF` data byte, kept as one byte
/// - `IAC <WILL|WONT|DO|DONT> <option>` – a three-byte negotiation, dropped
/// - `IAC SB ... IAC SE` – an option subnegotiation, dropped wholesale
///
/// Other two-byte `IAC <cmd>` sequences (NOP, GA, ...) are dropped as well.
/// The negotiation is never answered; OpenOCD's console works fine with a
/// client that stays silent about options.
pub fn strip_telnet_iac(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        if byte != IAC {
            out.push(byte);
            i += 1;
            continue;
        }

        match data.get(i + 1) {
            Some(&IAC) => {
                out.push(IAC);
                i += 2;
            }
            Some(&cmd) if (WILL..=DONT).contains(&cmd) => {
                // Negotiation verb plus its option byte.
                i += 3;
            }
            Some(&SB) => {
                // Skip to the terminating IAC SE.
                let mut j = i + 2;
                while j < data.len() {
                    if data[j] == IAC && data.get(j + 1) == Some(&SE) {
                        j += 2;
                        break;
                    }
                    j += 1;
                }
                i = j.max(i + 2);
            }
            Some(_) => i += 2,
            // Trailing lone IAC at a read boundary is dropped.
            None => break,
        }
    }

    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
