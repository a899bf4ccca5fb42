//! `columnsTemplate` / `rowsTemplate` parsing.
//!
//! A template is a whitespace separated list of tracks: `Nfr`, `Npx`, `Nvp`,
//! bare numbers (layout units), `N%` of the container, `repeat(n, tracks..)`
//! and `repeat(auto-fill, size)`. Fraction tracks share whatever is left after
//! fixed tracks and gaps.

use smallvec::SmallVec;

use crate::error::GridError;

pub type TrackSizes = SmallVec<[f32; 8]>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Track {
    Fr(f32),
    Fixed(f32),
    Percent(f32),
}

#[derive(Clone, Debug, PartialEq)]
enum Item {
    Track(Track),
    AutoFill(Track),
}

/// Resolves `template` into concrete track lengths along an axis of `size`.
pub fn parse_template(template: &str, size: f32, gap: f32) -> Result<TrackSizes, GridError> {
    let items = parse_items(template)?;
    if items.is_empty() {
        return Err(GridError::EmptyTemplate);
    }

    let mut tracks: SmallVec<[Track; 8]> = SmallVec::new();
    let auto_fill = items.iter().position(|item| matches!(item, Item::AutoFill(_)));
    if let Some(at) = auto_fill {
        let fixed_others: f32 = items
            .iter()
            .filter_map(|item| match item {
                Item::Track(track) => Some(fixed_length(*track, size)),
                Item::AutoFill(_) => None,
            })
            .sum();
        let others = (items.len() - 1) as f32;
        for (i, item) in items.iter().enumerate() {
            match item {
                Item::Track(track) => tracks.push(*track),
                Item::AutoFill(track) if i == at => {
                    let length = fixed_length(*track, size);
                    if length <= 0.0 {
                        return Err(GridError::MalformedRepeat(template.to_string()));
                    }
                    let available = size - fixed_others - others * gap;
                    let count = ((available + gap) / (length + gap)).floor().max(1.0) as usize;
                    tracks.extend(std::iter::repeat(*track).take(count));
                }
                Item::AutoFill(_) => {
                    return Err(GridError::MalformedRepeat(template.to_string()));
                }
            }
        }
    } else {
        tracks.extend(items.iter().filter_map(|item| match item {
            Item::Track(track) => Some(*track),
            Item::AutoFill(_) => None,
        }));
    }

    Ok(resolve(&tracks, size, gap))
}

/// Like [`parse_template`], but a bad template degrades to one full track.
pub fn cross_tracks_or_single(template: Option<&str>, size: f32, gap: f32) -> TrackSizes {
    let Some(template) = template else {
        return smallvec::smallvec![size];
    };
    match parse_template(template, size, gap) {
        Ok(tracks) => tracks,
        Err(err) => {
            log::warn!("{err}; using a single track");
            smallvec::smallvec![size]
        }
    }
}

fn fixed_length(track: Track, size: f32) -> f32 {
    match track {
        Track::Fr(_) => 0.0,
        Track::Fixed(px) => px,
        Track::Percent(p) => size * p / 100.0,
    }
}

fn resolve(tracks: &[Track], size: f32, gap: f32) -> TrackSizes {
    let gaps = gap * (tracks.len().saturating_sub(1)) as f32;
    let fixed: f32 = tracks.iter().map(|t| fixed_length(*t, size)).sum();
    let total_fr: f32 = tracks
        .iter()
        .map(|t| match t {
            Track::Fr(fr) => *fr,
            _ => 0.0,
        })
        .sum();
    let remaining = (size - fixed - gaps).max(0.0);
    let unit = if total_fr > 0.0 {
        remaining / total_fr
    } else {
        0.0
    };

    tracks
        .iter()
        .map(|t| match t {
            Track::Fr(fr) => fr * unit,
            other => fixed_length(*other, size),
        })
        .collect()
}

fn parse_items(template: &str) -> Result<Vec<Item>, GridError> {
    let mut items = Vec::new();
    for token in split_top_level(template, |c| c.is_whitespace()) {
        if let Some(body) = token
            .strip_prefix("repeat(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut parts = split_top_level(body, |c| c == ',').into_iter();
            let count = parts
                .next()
                .ok_or_else(|| GridError::MalformedRepeat(template.to_string()))?;
            let inner: Vec<&str> = parts.collect();
            if inner.is_empty() {
                return Err(GridError::MalformedRepeat(template.to_string()));
            }
            let mut repeated = Vec::new();
            for part in inner {
                for sub in split_top_level(part, |c| c.is_whitespace()) {
                    repeated.push(parse_track(template, sub)?);
                }
            }

            if count == "auto-fill" || count == "auto-fit" {
                match repeated.as_slice() {
                    [track @ (Track::Fixed(_) | Track::Percent(_))] => {
                        items.push(Item::AutoFill(*track))
                    }
                    _ => return Err(GridError::MalformedRepeat(template.to_string())),
                }
            } else {
                let n: usize = count
                    .parse()
                    .map_err(|_| GridError::MalformedRepeat(template.to_string()))?;
                for _ in 0..n {
                    items.extend(repeated.iter().map(|t| Item::Track(*t)));
                }
            }
        } else {
            items.push(Item::Track(parse_track(template, token)?));
        }
    }
    Ok(items)
}

fn parse_track(template: &str, token: &str) -> Result<Track, GridError> {
    let invalid = || GridError::InvalidTrack {
        template: template.to_string(),
        token: token.to_string(),
    };
    let number = |s: &str| -> Result<f32, GridError> {
        let value: f32 = s.parse().map_err(|_| invalid())?;
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(invalid())
        }
    };

    if let Some(n) = token.strip_suffix("fr") {
        Ok(Track::Fr(if n.is_empty() { 1.0 } else { number(n)? }))
    } else if let Some(n) = token.strip_suffix("px") {
        Ok(Track::Fixed(number(n)?))
    } else if let Some(n) = token.strip_suffix("vp") {
        Ok(Track::Fixed(number(n)?))
    } else if let Some(n) = token.strip_suffix('%') {
        Ok(Track::Percent(number(n)?))
    } else {
        Ok(Track::Fixed(number(token)?))
    }
}

/// Splits on `sep` outside parentheses, dropping empty pieces.
fn split_top_level(s: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && sep(c) => {
                let piece = s[start..i].trim();
                if !piece.is_empty() {
                    out.push(piece);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let tail = s[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_share_remaining_space() {
        let tracks = parse_template("1fr 1fr 2fr", 420.0, 10.0).unwrap();
        assert_eq!(tracks.as_slice(), &[100.0, 100.0, 200.0]);
    }

    #[test]
    fn fixed_and_percent_tracks_are_taken_first() {
        let tracks = parse_template("100px 25% 1fr", 400.0, 0.0).unwrap();
        assert_eq!(tracks.as_slice(), &[100.0, 100.0, 200.0]);
    }

    #[test]
    fn repeat_expands_tracks() {
        let tracks = parse_template("repeat(3, 1fr)", 300.0, 0.0).unwrap();
        assert_eq!(tracks.len(), 3);
        let mixed = parse_template("repeat(2, 50px 1fr)", 300.0, 0.0).unwrap();
        assert_eq!(mixed.as_slice(), &[50.0, 100.0, 50.0, 100.0]);
    }

    #[test]
    fn auto_fill_counts_tracks_that_fit() {
        let tracks = parse_template("repeat(auto-fill, 100)", 350.0, 10.0).unwrap();
        assert_eq!(tracks.as_slice(), &[100.0, 100.0, 100.0]);
    }

    #[test]
    fn malformed_templates_are_errors() {
        assert_eq!(parse_template("   ", 100.0, 0.0), Err(GridError::EmptyTemplate));
        assert!(matches!(
            parse_template("1fr abc", 100.0, 0.0),
            Err(GridError::InvalidTrack { .. })
        ));
        assert!(matches!(
            parse_template("repeat(x, 1fr)", 100.0, 0.0),
            Err(GridError::MalformedRepeat(_))
        ));
    }

    #[test]
    fn bad_template_falls_back_to_single_track() {
        let tracks = cross_tracks_or_single(Some("-1fr"), 240.0, 8.0);
        assert_eq!(tracks.as_slice(), &[240.0]);
    }
}
