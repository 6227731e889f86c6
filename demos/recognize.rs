//! Example: recognise a short digit string from synthetic two-coefficient
//! features.
//!
//! Run with:
//! `cargo run --example recognize`
//!
//! Each digit's template is a small rising ramp centred on the digit value,
//! so neighbouring digits are easy to tell apart and the cut points are
//! visible in the output.

use dtw_digits::{Digit, DigitError, FeatureSequence, RecognizerBuilder, TemplateStore};

fn ramp(digit: Digit, len: usize) -> Vec<[f64; 2]> {
    let base = f64::from(digit.value()) * 3.0;
    (0..len)
        .map(|t| [base + t as f64 * 0.1, base - t as f64 * 0.1])
        .collect()
}

fn main() -> Result<(), DigitError> {
    let mut store = TemplateStore::new();
    for digit in Digit::ALL {
        store.insert(digit, FeatureSequence::from_frames(&ramp(digit, 6))?)?;
        store.insert(digit, FeatureSequence::from_frames(&ramp(digit, 8))?)?;
    }

    let recognizer = RecognizerBuilder::new(store).build()?;
    let config = recognizer.config();
    println!(
        "locality {}, segment lengths [{}, {}]",
        config.locality, config.l_min, config.l_max
    );

    // "4071" spoken at slightly different rates.
    let mut frames = Vec::new();
    for (value, len) in [(4u8, 7), (0, 6), (7, 8), (1, 7)] {
        let digit = Digit::try_from(value)?;
        frames.extend(ramp(digit, len));
    }
    let input = FeatureSequence::from_frames(&frames)?;

    let result = recognizer.segment(&input)?;
    println!("Recognised: {result} (total cost {})", result.score());
    for s in result.segments() {
        println!(
            "  digit {} frames [{}, {}] cost {}",
            s.digit, s.start, s.end, s.score
        );
    }

    let single = recognizer.classify(input.view(0, 6)?)?;
    if let Some(digit) = single.digit {
        println!("First segment alone classifies as {digit}");
    }
    Ok(())
}
