use crate::controller::ExportAction;

/// Maps a key press to an export action. `modifier` is Ctrl or Cmd.
pub fn action_for_key(key: &str, modifier: bool, shift: bool) -> Option<ExportAction> {
    if !modifier {
        return None;
    }
    match (key, shift) {
        ("s", false) => Some(ExportAction::Raster),
        ("S", true) | ("s", true) => Some(ExportAction::Vector),
        ("C", true) | ("c", true) => Some(ExportAction::Share),
        _ => None,
    }
}
