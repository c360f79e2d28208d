//! Cursor shapes requested by the interaction handlers

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorShape {
    #[default]
    Arrow,
    Hand,
    /// Diagonal, top-left to bottom-right
    SizeNwse,
    /// Diagonal, top-right to bottom-left
    SizeNesw,
    SizeWe,
    SizeNs,
}

#[cfg(windows)]
impl CursorShape {
    pub(crate) fn system_id(self) -> windows::core::PCWSTR {
        use windows::Win32::UI::WindowsAndMessaging::{
            IDC_ARROW, IDC_HAND, IDC_SIZENESW, IDC_SIZENS, IDC_SIZENWSE, IDC_SIZEWE,
        };

        match self {
            CursorShape::Arrow => IDC_ARROW,
            CursorShape::Hand => IDC_HAND,
            CursorShape::SizeNwse => IDC_SIZENWSE,
            CursorShape::SizeNesw => IDC_SIZENESW,
            CursorShape::SizeWe => IDC_SIZEWE,
            CursorShape::SizeNs => IDC_SIZENS,
        }
    }
}
