// Slate dark theme
//
// Utilitarian, outline-first controls:
// - Inputs are outlined on the surface, no fill of their own
// - Disabled state dims text and swaps the border for the muted tone
// - Accent is reserved for focus rings, toggles and the primary action

// Backgrounds, two tiers: base surface and elevated titlebar
pub const SURFACE: u32 = 0x16181d;
pub const TITLEBAR_BACKGROUND: u32 = 0x1d2026;
pub const INPUT_BACKGROUND: u32 = 0x16181d; // matches SURFACE, outlined-only inputs
pub const LOG_BACKGROUND: u32 = 0x101216;

// Borders
pub const BORDER: u32 = 0x32363e; // default border and disabled fill
pub const BORDER_FOCUS: u32 = 0x4f9cf7; // blue accent, focus rings only

// Text
pub const TEXT_PRIMARY: u32 = 0xe8eaed;
pub const TEXT_DIM: u32 = 0x8b909a; // labels, secondary text, disabled controls
pub const TEXT_WHITE: u32 = 0xffffff; // on colored surfaces
pub const INPUT_PLACEHOLDER: u32 = 0x8b909a66;
pub const LOG_TEXT: u32 = 0xaab0ba;
pub const LOG_PLACEHOLDER: u32 = 0x4a4f58;

// Primary action and accent
pub const BUTTON_PRIMARY: u32 = 0x3d7fd4;
pub const BUTTON_HOVER: u32 = 0x2f66ad;

// Danger
pub const BUTTON_DANGER: u32 = 0xd64561;
pub const BUTTON_DANGER_HOVER: u32 = 0xb23750;

// Status indicators
pub const COLOR_RED: u32 = 0xe05d77;
pub const COLOR_YELLOW: u32 = 0xd9a441;
pub const COLOR_GREEN: u32 = 0x57b97a;

// Selection highlight
pub const SELECTION: u32 = 0x4f9cf740;

// Typography
pub const TEXT_SIZE_MEDIUM: f32 = 13.0;
pub const TEXT_SIZE_SMALL: f32 = 12.0;
pub const TEXT_SIZE_EXTRA_SMALL: f32 = 10.0;

pub const LINE_HEIGHT_MEDIUM: f32 = 18.0;
pub const LINE_HEIGHT_EXTRA_SMALL: f32 = 14.0;

// Element sizing
pub const ELEMENT_HEIGHT: f32 = 32.0;
pub const TITLEBAR_HEIGHT: f32 = 32.0;

// Radius
pub const RADIUS: f32 = 4.0;
pub const CURSOR_WIDTH: f32 = 2.0;

// Spacing
pub const GAP_EXTRA_SMALL: f32 = 4.0;
pub const GAP_SMALL: f32 = 8.0;
pub const GAP_MEDIUM: f32 = 12.0;

// Padding
pub const PADDING_INPUT_HORIZONTAL: f32 = 10.0;
pub const PADDING_INPUT_VERTICAL: f32 = 6.0;

pub const PADDING_COLUMN: f32 = 20.0;
pub const PADDING_COLUMN_TOP: f32 = 8.0;
pub const PADDING_LOG: f32 = 8.0;

// Layout
pub const WINDOW_WIDTH: f32 = 980.0;
pub const WINDOW_HEIGHT: f32 = 680.0;
pub const LEFT_COLUMN_WIDTH: f32 = 420.0;
pub const APP_ROW_BUTTON_WIDTH: f32 = 80.0;

// Toggle
pub const TOGGLE_WIDTH: f32 = 34.0;
pub const TOGGLE_HEIGHT: f32 = 18.0;
pub const TOGGLE_DOT_SIZE: f32 = 14.0;
pub const TOGGLE_DOT_ON_OFFSET: f32 = 18.0;
pub const TOGGLE_DOT_OFF_OFFSET: f32 = 2.0;

// Status dot
pub const STATUS_DOT_SIZE: f32 = 8.0;
