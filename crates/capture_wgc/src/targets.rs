//! Enumerating capturable windows and monitors

use crate::{CaptureError, CaptureResult, CaptureTarget, FrameSize, TargetInfo};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use windows::{
    Graphics::Capture::GraphicsCaptureItem,
    Win32::Foundation::{BOOL, HWND, LPARAM, RECT},
    Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_CLOAKED},
    Win32::Graphics::Gdi::{
        EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
    },
    Win32::System::WinRT::Graphics::Capture::IGraphicsCaptureItemInterop,
    Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetAncestor, GetWindow, GetWindowLongW, GetWindowRect, GetWindowTextW,
        IsWindow, IsWindowVisible, GA_ROOT, GWL_EXSTYLE, GWL_STYLE, GW_OWNER, WS_DISABLED,
        WS_EX_TOOLWINDOW,
    },
};

/// Smallest window side worth offering as a target
const MIN_WINDOW_SIDE: i32 = 50;

/// List top-level windows (in Z-order) followed by monitors
pub fn enumerate_targets() -> Vec<TargetInfo> {
    let mut targets = enumerate_windows();
    targets.extend(enumerate_monitors());
    targets
}

/// Current size of `target` as WGC reports it
pub fn target_size(target: &CaptureTarget) -> CaptureResult<FrameSize> {
    let size = create_capture_item(target)?.Size()?;
    Ok(FrameSize::new(size.Width.max(0) as u32, size.Height.max(0) as u32))
}

pub(crate) fn create_capture_item(target: &CaptureTarget) -> CaptureResult<GraphicsCaptureItem> {
    unsafe {
        let interop: IGraphicsCaptureItemInterop =
            windows::core::factory::<GraphicsCaptureItem, IGraphicsCaptureItemInterop>()?;

        match target {
            CaptureTarget::Window(hwnd) => {
                let hwnd = HWND(*hwnd as _);
                if !IsWindow(hwnd).as_bool() {
                    return Err(CaptureError::InvalidTarget);
                }
                Ok(interop.CreateForWindow(hwnd)?)
            }
            CaptureTarget::Monitor(hmonitor) => Ok(interop.CreateForMonitor(HMONITOR(*hmonitor as _))?),
        }
    }
}

fn enumerate_windows() -> Vec<TargetInfo> {
    let mut windows = Vec::new();

    unsafe {
        let _ = EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut windows as *mut Vec<TargetInfo> as isize),
        );
    }

    windows
}

unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<TargetInfo>);

    if should_include_window(hwnd) {
        let title = window_title(hwnd);
        if !title.is_empty() {
            windows.push(TargetInfo {
                name: title,
                target: CaptureTarget::Window(hwnd.0 as isize),
            });
        }
    }

    BOOL(1)
}

unsafe fn should_include_window(hwnd: HWND) -> bool {
    if !IsWindowVisible(hwnd).as_bool() {
        return false;
    }

    let style = GetWindowLongW(hwnd, GWL_STYLE) as u32;
    if style & WS_DISABLED.0 != 0 {
        return false;
    }

    let ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
    if ex_style & WS_EX_TOOLWINDOW.0 != 0 {
        return false;
    }

    // Cloaked windows live on another virtual desktop
    let mut cloaked: u32 = 0;
    if DwmGetWindowAttribute(
        hwnd,
        DWMWA_CLOAKED,
        &mut cloaked as *mut _ as *mut _,
        std::mem::size_of::<u32>() as u32,
    )
    .is_ok()
        && cloaked != 0
    {
        return false;
    }

    if let Ok(owner) = GetWindow(hwnd, GW_OWNER) {
        if !owner.is_invalid() {
            return false;
        }
    }

    if GetAncestor(hwnd, GA_ROOT) != hwnd {
        return false;
    }

    let mut rect = RECT::default();
    if GetWindowRect(hwnd, &mut rect).is_err() {
        return false;
    }

    rect.right - rect.left > MIN_WINDOW_SIDE && rect.bottom - rect.top > MIN_WINDOW_SIDE
}

unsafe fn window_title(hwnd: HWND) -> String {
    let mut buf = [0u16; 512];
    let len = GetWindowTextW(hwnd, &mut buf);
    if len > 0 {
        wide_to_string(&buf[..len as usize])
    } else {
        String::new()
    }
}

fn enumerate_monitors() -> Vec<TargetInfo> {
    let mut monitors = Vec::new();

    unsafe {
        let _ = EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(enum_monitor_callback),
            LPARAM(&mut monitors as *mut Vec<TargetInfo> as isize),
        );
    }

    monitors
}

unsafe extern "system" fn enum_monitor_callback(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = &mut *(lparam.0 as *mut Vec<TargetInfo>);

    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;
    if GetMonitorInfoW(hmonitor, &mut info as *mut _ as *mut MONITORINFO).as_bool() {
        let len = info.szDevice.iter().position(|&c| c == 0).unwrap_or(info.szDevice.len());
        monitors.push(TargetInfo {
            name: wide_to_string(&info.szDevice[..len]),
            target: CaptureTarget::Monitor(hmonitor.0 as isize),
        });
    }

    BOOL(1)
}

fn wide_to_string(wide: &[u16]) -> String {
    OsString::from_wide(wide).to_string_lossy().into_owned()
}
