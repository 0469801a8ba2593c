use crate::icon::IconIdentifier;
use crate::pixbuf::RawImage;
use crate::scale::scale_to_limit;
use crate::search::resolve;
use crate::settings::IconSettings;
use crate::surface::{RenderSurface, to_surface};

/// Anything that carries a notification icon: inline pixels, a textual reference, or neither.
pub trait NotificationIcon {
    /// Pixel data sent along with the notification.
    fn raw_icon(&self) -> Option<&RawImage>;
    /// A path, `file://` URI or icon name.
    fn icon(&self) -> Option<&str>;
}

/// Resolve an icon identifier into a surface no larger than `settings.max_icon_size`.
///
/// Returns `None` if the identifier yields no pixels. Otherwise the pixels are scaled down if
/// needed and converted into a [RenderSurface].
pub fn resolve_notification_icon(
    identifier: &IconIdentifier<'_>,
    settings: &IconSettings,
) -> Option<RenderSurface> {
    let buffer = resolve(identifier, &settings.icon_path)?;
    let buffer = scale_to_limit(buffer, settings.max_icon_size);

    match to_surface(buffer) {
        Ok(surface) => Some(surface),
        Err(_e) => {
            #[cfg(feature = "log")]
            log::debug!("could not produce icon surface: {_e}");

            None
        }
    }
}

/// Like [resolve_notification_icon], picking the identifier from a notification.
///
/// Inline pixels win over a textual icon; a notification with neither has no icon.
pub fn icon_for_notification<N>(notification: &N, settings: &IconSettings) -> Option<RenderSurface>
where
    N: NotificationIcon + ?Sized,
{
    let identifier = IconIdentifier::from_parts(notification.raw_icon(), notification.icon())?;

    resolve_notification_icon(&identifier, settings)
}
