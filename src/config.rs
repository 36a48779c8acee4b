//! Configuration loading for the maze factory

use serde::Deserialize;
use std::path::Path;

use crate::error::{MazeError, Result};

/// Dimensions and room budget of one skill level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct SkillLevel {
    pub width: u16,
    pub height: u16,
    /// Rooms opened in imperfect mazes of this level
    #[serde(default)]
    pub rooms: usize,
}

impl SkillLevel {
    pub const fn new(width: u16, height: u16, rooms: usize) -> Self {
        SkillLevel {
            width,
            height,
            rooms,
        }
    }
}

/// What the factory does with an order that arrives while another one is
/// still being built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Build it after the current one
    #[default]
    Queue,
    /// Refuse it with [`MazeError::FactoryBusy`]
    Reject,
}

/// Main configuration structure
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FactoryConfig {
    /// Skill level `n` builds a maze of `skills[n]`
    #[serde(default = "default_skills")]
    pub skills: Vec<SkillLevel>,

    #[serde(default)]
    pub busy_policy: BusyPolicy,

    /// Largest side of a room, in cells (default: 5)
    #[serde(default = "default_max_room_size")]
    pub max_room_size: u16,
}

impl FactoryConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: FactoryConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.skills.is_empty() {
            return Err(MazeError::Config("no skill levels configured".to_string()));
        }
        if let Some((level, skill)) = self
            .skills
            .iter()
            .enumerate()
            .find(|(_, s)| s.width == 0 || s.height == 0)
        {
            return Err(MazeError::Config(format!(
                "skill level {level} has invalid dimensions {}x{}",
                skill.width, skill.height
            )));
        }
        Ok(())
    }

    /// Looks up the dimensions of a skill level.
    pub fn skill(&self, level: u8) -> Result<SkillLevel> {
        self.skills
            .get(level as usize)
            .copied()
            .ok_or(MazeError::UnknownSkill(level))
    }

    /// A configuration with the given skill table and defaults elsewhere.
    pub fn with_skills(skills: Vec<SkillLevel>) -> Self {
        FactoryConfig {
            skills,
            ..Self::default()
        }
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            skills: default_skills(),
            busy_policy: BusyPolicy::default(),
            max_room_size: default_max_room_size(),
        }
    }
}

// Default value functions
fn default_skills() -> Vec<SkillLevel> {
    const WIDTHS: [u16; 16] = [
        4, 12, 15, 20, 25, 25, 35, 35, 40, 60, 70, 80, 90, 110, 120, 150,
    ];
    const HEIGHTS: [u16; 16] = [
        4, 12, 15, 15, 20, 25, 25, 35, 40, 60, 70, 75, 75, 90, 120, 150,
    ];
    const ROOMS: [usize; 16] = [0, 2, 2, 3, 4, 5, 10, 10, 20, 45, 45, 50, 50, 60, 80, 90];
    (0..WIDTHS.len())
        .map(|i| SkillLevel::new(WIDTHS[i], HEIGHTS[i], ROOMS[i]))
        .collect()
}
fn default_max_room_size() -> u16 {
    5
}
