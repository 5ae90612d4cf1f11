//! Target registry
//!
//! Fixed table from board alias to the toolchain's (platform, board,
//! framework) triple. Adding a target means editing [`TARGETS`].

use crate::error::JobError;
use firmforge_types::TargetConfig;

/// One registry row.
#[derive(Debug, Clone, Copy)]
pub struct TargetEntry {
    pub alias: &'static str,
    pub config: TargetConfig,
}

const fn entry(
    alias: &'static str,
    platform: &'static str,
    board: &'static str,
    framework: &'static str,
) -> TargetEntry {
    TargetEntry {
        alias,
        config: TargetConfig::new(platform, board, framework),
    }
}

/// Supported targets, in discovery order.
pub const TARGETS: &[TargetEntry] = &[
    // Arduino AVR
    entry("uno", "atmelavr", "uno", "arduino"),
    entry("nano", "atmelavr", "nanoatmega328", "arduino"),
    entry("mega", "atmelavr", "megaatmega2560", "arduino"),
    entry("leonardo", "atmelavr", "leonardo", "arduino"),
    entry("micro", "atmelavr", "micro", "arduino"),
    entry("promini", "atmelavr", "pro8MHzatmega328", "arduino"),
    // ESP32
    entry("esp32", "espressif32", "esp32dev", "arduino"),
    entry("esp32s2", "espressif32", "esp32-s2-saola-1", "arduino"),
    entry("esp32s3", "espressif32", "esp32-s3-devkitc-1", "arduino"),
    entry("esp32c3", "espressif32", "esp32-c3-devkitm-1", "arduino"),
    // ESP8266
    entry("esp8266", "espressif8266", "esp12e", "arduino"),
    entry("nodemcu", "espressif8266", "nodemcuv2", "arduino"),
    entry("d1mini", "espressif8266", "d1_mini", "arduino"),
    entry("wemos", "espressif8266", "d1_mini", "arduino"),
    // STM32
    entry("bluepill", "ststm32", "bluepill_f103c8", "arduino"),
    entry("blackpill", "ststm32", "blackpill_f401cc", "arduino"),
    entry("stm32f103", "ststm32", "genericSTM32F103C8", "arduino"),
    entry("stm32f401", "ststm32", "genericSTM32F401CC", "arduino"),
    // Teensy
    entry("teensy40", "teensy", "teensy40", "arduino"),
    entry("teensy41", "teensy", "teensy41", "arduino"),
    entry("teensy32", "teensy", "teensy31", "arduino"),
    // Bare ATmega
    entry("atmega328p", "atmelavr", "ATmega328P", "arduino"),
    entry("atmega2560", "atmelavr", "megaatmega2560", "arduino"),
];

/// Read-only view over [`TARGETS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetRegistry;

impl TargetRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Exact, case-sensitive alias lookup.
    pub fn resolve(&self, alias: &str) -> Result<TargetConfig, JobError> {
        TARGETS
            .iter()
            .find(|e| e.alias == alias)
            .map(|e| e.config)
            .ok_or_else(|| JobError::UnknownTarget(alias.to_string()))
    }

    pub fn contains(&self, alias: &str) -> bool {
        TARGETS.iter().any(|e| e.alias == alias)
    }

    /// All aliases, in table order.
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> {
        TARGETS.iter().map(|e| e.alias)
    }

    pub fn entries(&self) -> &'static [TargetEntry] {
        TARGETS
    }
}
