//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use x86gen_proc_macro::vocabulary;

vocabulary! {
	/// Segment registers.
	pub enum Segment {
		Cs = "CS",
		/// Thread-local base on most systems.
		Fs = "FS",
		Gs = "GS",
	}

	enum Marker {
		NoPrefix = "NP",
		NoFxPrefix = "NFx",
	}
}

#[test]
fn tokens_round_trip_through_lookup() {
	for &segment in Segment::ALL {
		assert_eq!(Segment::from_token(segment.token()), Some(segment));
	}
	assert_eq!(Segment::ALL, &[Segment::Cs, Segment::Fs, Segment::Gs]);
}

#[test]
fn lookup_is_exact_and_case_sensitive() {
	assert_eq!(Marker::from_token("NFx"), Some(Marker::NoFxPrefix));
	assert_eq!(Marker::from_token("NFX"), None);
	assert_eq!(Marker::from_token("NP "), None);
	assert_eq!(Segment::from_token(""), None);
}

#[test]
fn display_writes_the_token() {
	assert_eq!(Segment::Gs.to_string(), "GS");
	assert_eq!(format!("{}|{}", Marker::NoPrefix, Marker::NoFxPrefix), "NP|NFx");
}

#[test]
fn ordering_follows_declaration() {
	let mut shuffled = vec![Segment::Gs, Segment::Cs, Segment::Fs];
	shuffled.sort();
	assert_eq!(shuffled, Segment::ALL);
}
