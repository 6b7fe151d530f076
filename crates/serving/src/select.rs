use crate::{PredictError, ProbabilityRow};

/// Label with the highest probability in `row`.
///
/// Ties go to the label that comes first in the row.
pub fn arg_max(row: &ProbabilityRow) -> Option<&str> {
    let mut best: Option<(&str, f32)> = None;
    for (label, probability) in row.iter() {
        match best {
            Some((_, top)) if probability > top => best = Some((label, probability)),
            None => best = Some((label, probability)),
            _ => {}
        }
    }
    best.map(|(label, _)| label)
}

/// Pick the arg-max label of every row, in row order.
pub fn select(rows: &[ProbabilityRow]) -> Result<Vec<String>, PredictError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            arg_max(row)
                .map(str::to_string)
                .ok_or(PredictError::EmptyRow { row: index })
        })
        .collect()
}
