//! Sprite identifiers and the loaded-asset table
//!
//! Every sprite is optional. Draw code asks the table and falls back to
//! procedural shapes when an image is missing.

use crate::sim::{CollectibleKind, EntityKind, ObstacleKind};

/// Named sprite slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Truck,
    Ground,
    TrashCan,
    Gameboy,
    IntroBackground,
    Player,
    Background,
    Obstacle,
    Gorbhouse,
    Gorbhouse2,
    GorboyLogo,
    TrashcoinLogo,
    Oscar,
    Lexnode,
    Ellison,
    WalletIcon,
}

impl SpriteId {
    pub const COUNT: usize = 16;

    pub const ALL: [SpriteId; Self::COUNT] = [
        SpriteId::Truck,
        SpriteId::Ground,
        SpriteId::TrashCan,
        SpriteId::Gameboy,
        SpriteId::IntroBackground,
        SpriteId::Player,
        SpriteId::Background,
        SpriteId::Obstacle,
        SpriteId::Gorbhouse,
        SpriteId::Gorbhouse2,
        SpriteId::GorboyLogo,
        SpriteId::TrashcoinLogo,
        SpriteId::Oscar,
        SpriteId::Lexnode,
        SpriteId::Ellison,
        SpriteId::WalletIcon,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Served path of the image
    pub fn url(self) -> &'static str {
        match self {
            SpriteId::Truck => "/assets/truck.png",
            SpriteId::Ground => "/assets/ground.png",
            SpriteId::TrashCan => "/assets/trash_can.png",
            SpriteId::Gameboy => "/assets/gameboy.png",
            SpriteId::IntroBackground => "/assets/intro_bg.png",
            SpriteId::Player => "/assets/gorbage-truck-.png",
            SpriteId::Background => "/assets/background.jpg",
            SpriteId::Obstacle => "/assets/obstacle-1.png",
            SpriteId::Gorbhouse => "/assets/gorbhouse.png",
            SpriteId::Gorbhouse2 => "/assets/gorbhouse-2.png",
            SpriteId::GorboyLogo => "/assets/gorboy-logo.png",
            SpriteId::TrashcoinLogo => "/assets/trashcoin-logo.png",
            SpriteId::Oscar => "/assets/oscar.png",
            SpriteId::Lexnode => "/assets/lexnode.png",
            SpriteId::Ellison => "/assets/ellison.png",
            SpriteId::WalletIcon => "/assets/gorbag-wallet-button.png",
        }
    }

    /// Sprites tried in order for an entity; empty means procedural only
    pub fn candidates_for(kind: EntityKind) -> &'static [SpriteId] {
        match kind {
            EntityKind::Obstacle(ObstacleKind::Ellison) => {
                &[SpriteId::Ellison, SpriteId::Obstacle, SpriteId::TrashCan]
            }
            EntityKind::Obstacle(ObstacleKind::TrashCan) => &[SpriteId::Obstacle, SpriteId::TrashCan],
            EntityKind::Collectible(c) => match c {
                CollectibleKind::Gameboy => &[SpriteId::Gameboy],
                CollectibleKind::Gorbhouse => &[SpriteId::Gorbhouse],
                CollectibleKind::Gorbhouse2 => &[SpriteId::Gorbhouse2],
                CollectibleKind::Gorboy => &[SpriteId::GorboyLogo],
                CollectibleKind::Trashcoin => &[SpriteId::TrashcoinLogo],
                CollectibleKind::Oscar => &[SpriteId::Oscar],
                CollectibleKind::Lexnode => &[SpriteId::Lexnode],
                CollectibleKind::Bottle | CollectibleKind::Can | CollectibleKind::Glass => &[],
            },
        }
    }

    /// Sprites for the player truck, preferred first
    pub const PLAYER_CANDIDATES: [SpriteId; 2] = [SpriteId::Player, SpriteId::Truck];
}

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, 4 bytes per pixel
    pub rgba: Vec<u8>,
}

/// One optional image per [`SpriteId`]
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    slots: [Option<SpriteImage>; SpriteId::COUNT],
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SpriteId, image: SpriteImage) {
        self.slots[id.index()] = Some(image);
    }

    pub fn get(&self, id: SpriteId) -> Option<&SpriteImage> {
        self.slots[id.index()].as_ref()
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.slots[id.index()].is_some()
    }

    /// First present sprite among `candidates`
    pub fn resolve(&self, candidates: &[SpriteId]) -> Option<SpriteId> {
        candidates.iter().copied().find(|&id| self.contains(id))
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &SpriteImage)> {
        SpriteId::ALL
            .iter()
            .filter_map(|&id| self.get(id).map(|img| (id, img)))
    }
}
