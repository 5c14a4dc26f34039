//! Orderlists and sequences.
//!
//! Each track (SID voice) has an orderlist: the sequences it plays, in order, each with a transposition. A sequence is
//! a list of `(instrument, command, note)` events. Both are variable-length and end in sentinel bytes, so every decoder
//! here takes an upper bound and gives up with [`FormatError::SentinelNotFound`] instead of running off into the
//! image.

use crate::{FormatError, Partial};

/// Orderlist bytes at or above this value (and below the terminators) set the transposition.
pub const TRANSPOSE_THRESHOLD: u8 = 0x80;
/// Transposition marker that leaves notes unchanged; the running transposition at the start of every orderlist.
pub const NO_TRANSPOSE: u8 = 0xA0;
/// Ends an orderlist; the track stops.
pub const ORDERLIST_END: u8 = 0xFE;
/// Ends an orderlist; the track loops.
pub const ORDERLIST_LOOP: u8 = 0xFF;

/// Note value that ends a sequence.
pub const SEQUENCE_END: u8 = 0x7F;
/// Note value that holds the previous note (tie / sustain).
pub const NOTE_TIE: u8 = 0x7E;
/// Note value that releases the gate.
pub const NOTE_GATE_OFF: u8 = 0x00;
/// Instrument or command value meaning "no change".
pub const NO_CHANGE: u8 = 0x80;

/// One sequence played by a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrderlistEntry {
	/// Transposition marker in effect (`0x80..=0xFD`, [`NO_TRANSPOSE`] is neutral).
	pub transpose:          u8,
	/// Sequence to play.
	pub sequence_index:     u8,
	/// Whether a marker byte preceded the entry, even one that repeats the running transposition.
	pub explicit_transpose: bool,
}

impl OrderlistEntry {
	/// An entry that plays with the running transposition.
	#[must_use]
	pub const fn new(transpose: u8, sequence_index: u8) -> Self {
		Self { transpose, sequence_index, explicit_transpose: false }
	}

	/// An entry preceded by a transposition marker.
	#[must_use]
	pub const fn with_marker(transpose: u8, sequence_index: u8) -> Self {
		Self { transpose, sequence_index, explicit_transpose: true }
	}

	/// Transposition in semitones relative to [`NO_TRANSPOSE`].
	#[must_use]
	pub fn semitones(&self) -> i16 {
		i16::from(self.transpose) - i16::from(NO_TRANSPOSE)
	}
}

/// A decoded orderlist together with the terminator that ended it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Orderlist {
	/// Entries in playback order.
	pub entries:    Vec<OrderlistEntry>,
	/// [`ORDERLIST_END`] or [`ORDERLIST_LOOP`].
	pub terminator: u8,
}

impl Orderlist {
	/// Whether the track loops after the last entry.
	#[must_use]
	pub const fn loops(&self) -> bool {
		self.terminator == ORDERLIST_LOOP
	}
}

/// What a sequence event's note byte means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Note {
	/// End of the sequence.
	End,
	/// Hold the previous note.
	Tie,
	/// Release the gate.
	GateOff,
	/// A pitch.
	Pitch(u8),
}

/// One step of a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SequenceEvent {
	/// Instrument to switch to, or [`NO_CHANGE`].
	pub instrument: u8,
	/// Command to run, or [`NO_CHANGE`].
	pub command:    u8,
	/// Note byte; see [`Note`].
	pub note:       u8,
}

impl SequenceEvent {
	/// The event that ends every sequence.
	pub const END: Self = Self { instrument: NO_CHANGE, command: NO_CHANGE, note: SEQUENCE_END };

	/// Interprets the note byte.
	#[must_use]
	pub const fn note(&self) -> Note {
		match self.note {
			SEQUENCE_END => Note::End,
			NOTE_TIE => Note::Tie,
			NOTE_GATE_OFF => Note::GateOff,
			pitch => Note::Pitch(pitch),
		}
	}

	/// Whether this event ends its sequence.
	#[must_use]
	pub const fn is_end(&self) -> bool {
		self.note == SEQUENCE_END
	}
}

/// Decodes the orderlist starting at `start`. At most `max_entries` entries are read.
///
/// # Errors
/// If neither terminator is found within `max_entries` entries or before the end of the buffer. The entries decoded
/// so far are returned with the error.
pub fn decode_orderlist(
	buffer: &[u8],
	start: usize,
	max_entries: usize,
) -> Result<Orderlist, Partial<Vec<OrderlistEntry>>> {
	let mut entries = Vec::new();
	let mut transpose = NO_TRANSPOSE;
	let mut position = start;
	let not_found = |entries: Vec<OrderlistEntry>| Partial {
		decoded: entries,
		error:   FormatError::SentinelNotFound { start, limit: max_entries },
	};

	loop {
		let Some(&byte) = buffer.get(position) else {
			return Err(not_found(entries));
		};
		match byte {
			ORDERLIST_END | ORDERLIST_LOOP => return Ok(Orderlist { entries, terminator: byte }),
			_ if entries.len() >= max_entries => return Err(not_found(entries)),
			TRANSPOSE_THRESHOLD .. => {
				let Some(&sequence_index) = buffer.get(position + 1) else {
					return Err(not_found(entries));
				};
				transpose = byte;
				entries.push(OrderlistEntry::with_marker(transpose, sequence_index));
				position += 2;
			},
			sequence_index => {
				entries.push(OrderlistEntry::new(transpose, sequence_index));
				position += 1;
			},
		}
	}
}

/// Encodes an orderlist. A transposition marker is emitted for every entry that had one and wherever the transposition
/// changes, starting from [`NO_TRANSPOSE`], so encoding a decoded orderlist reproduces its bytes.
///
/// # Errors
/// If an entry has a transposition outside the marker range, a sequence index in the marker range, or the terminator
/// is not one of the two terminator values.
pub fn encode_orderlist(orderlist: &Orderlist) -> Result<Vec<u8>, FormatError> {
	if !matches!(orderlist.terminator, ORDERLIST_END | ORDERLIST_LOOP) {
		return Err(FormatError::InvalidOrderlistEntry {
			index:  orderlist.entries.len(),
			reason: "terminator must be $fe or $ff",
		});
	}

	let mut bytes = Vec::with_capacity(orderlist.entries.len() * 2 + 1);
	let mut transpose = NO_TRANSPOSE;
	for (index, entry) in orderlist.entries.iter().enumerate() {
		if !(TRANSPOSE_THRESHOLD .. ORDERLIST_END).contains(&entry.transpose) {
			return Err(FormatError::InvalidOrderlistEntry { index, reason: "transposition must be in $80-$fd" });
		}
		if entry.sequence_index >= TRANSPOSE_THRESHOLD {
			return Err(FormatError::InvalidOrderlistEntry { index, reason: "sequence index must be below $80" });
		}
		if entry.explicit_transpose || entry.transpose != transpose {
			transpose = entry.transpose;
			bytes.push(transpose);
		}
		bytes.push(entry.sequence_index);
	}
	bytes.push(orderlist.terminator);
	Ok(bytes)
}

/// Decodes the sequence starting at `start`: 3-byte `(instrument, command, note)` events up to and including the
/// event whose note is [`SEQUENCE_END`]. At most `max_events` events are read.
///
/// # Errors
/// If no end event is found within `max_events` events or before the end of the buffer. The events decoded so far are
/// returned with the error.
pub fn decode_sequence(
	buffer: &[u8],
	start: usize,
	max_events: usize,
) -> Result<Vec<SequenceEvent>, Partial<Vec<SequenceEvent>>> {
	let mut events = Vec::new();
	let remaining = buffer.get(start ..).unwrap_or_default();

	for chunk in remaining.chunks_exact(3).take(max_events) {
		let event = SequenceEvent { instrument: chunk[0], command: chunk[1], note: chunk[2] };
		events.push(event);
		if event.is_end() {
			return Ok(events);
		}
	}
	Err(Partial { decoded: events, error: FormatError::SentinelNotFound { start, limit: max_events } })
}

/// Encodes a sequence. Encoding stops after the first end event, since decoding does too; the end event is appended if
/// there is none, so that encoding a decoded sequence reproduces its bytes exactly.
#[must_use]
pub fn encode_sequence(events: &[SequenceEvent]) -> Vec<u8> {
	let mut bytes = Vec::with_capacity(events.len() * 3 + 3);
	for event in events {
		bytes.extend_from_slice(&[event.instrument, event.command, event.note]);
		if event.is_end() {
			return bytes;
		}
	}
	let end = SequenceEvent::END;
	bytes.extend_from_slice(&[end.instrument, end.command, end.note]);
	bytes
}
