use super::LabelMap;
use crate::models::LabelObject;

/// Resolve overlaps so every pixel belongs to at most one object.
///
/// Where objects overlap, the one with the highest label keeps the pixel
/// (the lowest one with `reverse_ordering`). Objects left without pixels are
/// dropped.
pub fn make_unique(map: LabelMap, reverse_ordering: bool) -> LabelMap {
    let mut output = map.empty_like();
    let mut objects: Vec<LabelObject> = map.into_objects().collect();
    if !reverse_ordering {
        objects.reverse();
    }

    let mut claimed = LabelObject::new(output.background);
    for mut object in objects {
        object.optimize();
        object.subtract(&claimed);
        if object.is_empty() {
            continue;
        }
        for run in object.runs() {
            claimed.add_run(*run);
        }
        claimed.optimize();
        output.objects.insert(object.label, object);
    }

    output
}
