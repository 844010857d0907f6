use anyhow::Result;
use libris_exchange::Outcome;

/// Print outcomes one per line with a closing summary, or as a JSON array.
pub fn print_outcomes(outcomes: &[Outcome], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        return Ok(());
    }

    for outcome in outcomes {
        println!("{outcome}");
    }
    let (succeeded, failed) = tally(outcomes);
    println!("\n{succeeded} succeeded, {failed} failed");
    Ok(())
}

fn tally(outcomes: &[Outcome]) -> (usize, usize) {
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    (succeeded, outcomes.len() - succeeded)
}
