use super::{Device, DeviceRegistry};

/// Find the device a sentence talks about.
///
/// Devices are tried in registry order; for each one the display name is
/// checked before its aliases. The first hit wins, so a sentence naming two
/// devices silently resolves to the one registered first. Plain substring
/// matching also means a short alias such as "camera" can fire on unrelated
/// text. Both are known weaknesses of this resolver.
pub fn resolve_device<'a>(text: &str, registry: &'a DeviceRegistry) -> Option<&'a Device> {
    let t = text.to_lowercase();
    registry.iter().find(|dev| mentions(&t, dev))
}

fn mentions(lowered: &str, dev: &Device) -> bool {
    let name = dev.name.to_lowercase();
    if lowered.contains(&name) {
        return true;
    }
    dev.aliases
        .iter()
        .map(|a| a.to_lowercase())
        .any(|alias| lowered.contains(&alias))
}
