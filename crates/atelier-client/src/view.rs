//! Theme-forked views.
//!
//! Light and dark are separate experiences, not one skin with two colour
//! sets: the dark scene has a starfield and comet dividers, the light scene
//! a cursor follower on paper. [`select_view`] picks the whole tree at the
//! top of the render path.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use atelier_shared::ThemeMode;

use crate::decor::CometDivider;
use crate::events::Subscription;
use crate::routes::Page;
use crate::theme::ThemeContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        background: "#F7F3EC",
        surface: "#FFFFFF",
        text: "#1D1B18",
        muted: "#6B655C",
        accent: "#B5562F",
    };

    pub const DARK: Palette = Palette {
        background: "#07080F",
        surface: "#12141F",
        text: "#ECEAF4",
        muted: "#8C8AA3",
        accent: "#F2C46D",
    };

    pub fn for_mode(mode: ThemeMode) -> Palette {
        match mode {
            ThemeMode::Light => Self::LIGHT,
            ThemeMode::Dark => Self::DARK,
        }
    }
}

/// One component tree per theme.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemedView<L, D> {
    Light(L),
    Dark(D),
}

impl<L, D> ThemedView<L, D> {
    pub fn mode(&self) -> ThemeMode {
        match self {
            Self::Light(_) => ThemeMode::Light,
            Self::Dark(_) => ThemeMode::Dark,
        }
    }
}

/// Build only the tree for `mode`; the other builder is never called.
pub fn select_view<L, D>(
    mode: ThemeMode,
    light: impl FnOnce() -> L,
    dark: impl FnOnce() -> D,
) -> ThemedView<L, D> {
    match mode {
        ThemeMode::Light => ThemedView::Light(light()),
        ThemeMode::Dark => ThemedView::Dark(dark()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightScene {
    pub page: Page,
    pub palette: Palette,
    pub cursor_follower: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DarkScene {
    pub page: Page,
    pub palette: Palette,
    pub star_count: usize,
    pub divider: CometDivider,
}

pub type PageView = ThemedView<LightScene, DarkScene>;

pub const DARK_STAR_COUNT: usize = 150;

pub fn render_page(page: Page, mode: ThemeMode) -> PageView {
    select_view(
        mode,
        || LightScene {
            page,
            palette: Palette::LIGHT,
            cursor_follower: true,
        },
        || DarkScene {
            page,
            palette: Palette::DARK,
            star_count: DARK_STAR_COUNT,
            divider: CometDivider::default(),
        },
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct RootState {
    page: Page,
    view: PageView,
    renders: usize,
}

/// Top of the render path: holds the current page view and rebuilds it
/// whenever the theme changes.
pub struct ThemedRoot {
    state: Arc<Mutex<RootState>>,
    _subscription: Subscription,
}

impl ThemedRoot {
    pub fn mount(theme: &ThemeContext, page: Page) -> Self {
        let state = Arc::new(Mutex::new(RootState {
            page,
            view: render_page(page, theme.mode()),
            renders: 1,
        }));

        let s = state.clone();
        let subscription = theme.subscribe(move |mode| {
            let mut root = lock(&s);
            root.view = render_page(root.page, mode);
            root.renders += 1;
        });

        Self {
            state,
            _subscription: subscription,
        }
    }

    pub fn navigate(&self, page: Page) {
        let mut root = lock(&self.state);
        let mode = root.view.mode();
        root.page = page;
        root.view = render_page(page, mode);
        root.renders += 1;
    }

    pub fn view(&self) -> PageView {
        lock(&self.state).view.clone()
    }

    pub fn render_count(&self) -> usize {
        lock(&self.state).renders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::MemoryThemeStorage;

    #[test]
    fn test_select_view_builds_one_branch() {
        let view: ThemedView<u8, u8> = select_view(ThemeMode::Dark, || panic!("light built"), || 2);
        assert_eq!(view, ThemedView::Dark(2));
    }

    #[test]
    fn test_scenes_differ_by_theme() {
        match render_page(Page::Art, ThemeMode::Dark) {
            ThemedView::Dark(scene) => {
                assert_eq!(scene.star_count, DARK_STAR_COUNT);
                assert_eq!(scene.palette, Palette::DARK);
            }
            ThemedView::Light(_) => panic!("expected dark scene"),
        }
        match render_page(Page::Art, ThemeMode::Light) {
            ThemedView::Light(scene) => assert!(scene.cursor_follower),
            ThemedView::Dark(_) => panic!("expected light scene"),
        }
    }

    #[test]
    fn test_root_follows_theme() {
        let theme = ThemeContext::load(Arc::new(MemoryThemeStorage::default()), ThemeMode::Dark);
        let root = ThemedRoot::mount(&theme, Page::Home);
        assert_eq!(root.view().mode(), ThemeMode::Dark);

        theme.toggle();
        assert_eq!(root.view().mode(), ThemeMode::Light);
        assert_eq!(root.render_count(), 2);

        theme.set_mode(ThemeMode::Light);
        assert_eq!(root.render_count(), 2);
    }

    #[test]
    fn test_root_unmount_releases_subscription() {
        let theme = ThemeContext::load(Arc::new(MemoryThemeStorage::default()), ThemeMode::Dark);
        for _ in 0..3 {
            let root = ThemedRoot::mount(&theme, Page::Design);
            root.navigate(Page::Impressum);
            assert_eq!(theme.subscriber_count(), 1);
        }
        assert_eq!(theme.subscriber_count(), 0);
    }
}
