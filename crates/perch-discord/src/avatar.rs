//! CDN avatar URLs.

use crate::model::DiscordUser;

/// Resolves a user's avatar to a CDN URL.
///
/// Custom avatars live under `avatars/{id}/{hash}`; animated ones (`a_`
/// prefix) are served as GIF. Users without one get a default
/// `embed/avatars/{n}.png`, where `n` comes from the snowflake for
/// unique-username accounts and from the discriminator otherwise.
pub fn avatar_url(cdn_base: &str, user: &DiscordUser) -> String {
    let cdn_base = cdn_base.trim_end_matches('/');
    match user.avatar.as_deref() {
        Some(hash) if !hash.is_empty() => {
            let ext = if hash.starts_with("a_") { "gif" } else { "png" };
            format!("{cdn_base}/avatars/{}/{hash}.{ext}", user.id)
        }
        _ => format!(
            "{cdn_base}/embed/avatars/{}.png",
            default_avatar_index(user)
        ),
    }
}

fn default_avatar_index(user: &DiscordUser) -> u64 {
    match user.discriminator.as_deref() {
        None | Some("") | Some("0") => user.id.parse::<u64>().map(|id| (id >> 22) % 6).unwrap_or(0),
        Some(discriminator) => discriminator.parse::<u64>().map(|d| d % 5).unwrap_or(0),
    }
}
