use crate::care::CareKind;

/// One summary per user: a line per care track with due plants, either
/// "Water: Monstera" for a single plant or "Water 2 plants" for more.
/// Returns `None` when every group is empty, so fully caught-up users get
/// no notification at all.
pub fn compose_summary(groups: &[(CareKind, Vec<String>)]) -> Option<String> {
    let lines: Vec<String> = groups
        .iter()
        .filter_map(|(kind, names)| match names.as_slice() {
            [] => None,
            [name] => Some(format!("{}: {}", kind.verb(), name)),
            many => Some(format!("{} {} plants", kind.verb(), many.len())),
        })
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
