//! Host window: a top-level frame whose client area holds the render surface
//! as a child window, with pointer input routed to the interaction machine.

use crate::cursor::CursorShape;
use crate::interaction::{InteractionMachine, InteractionOutcome};
use crate::outline::paint_outline;
use crate::pointer::{PointerButtons, PointerKind, PointerState};
use crate::{OverlayError, OverlayResult};
use geometry::{Point, Rect, Size};
use once_cell::sync::OnceCell;
use render::SharedViewport;
use std::cell::RefCell;
use std::ffi::c_void;
use tracing::{debug, info, warn};
use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, EndPaint, GetStockObject, InvalidateRect, ScreenToClient, UpdateWindow,
    BLACK_BRUSH, HBRUSH, PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{GetCapture, ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetMessageW, LoadCursorW, PostMessageW, PostQuitMessage, RegisterClassExW, SetCursor,
    SetWindowPos, ShowWindow, TranslateMessage, CS_DBLCLKS, CS_HREDRAW, CS_VREDRAW,
    CW_USEDEFAULT, HTCLIENT, HTTRANSPARENT, MSG, SWP_NOACTIVATE, SWP_NOZORDER, SW_SHOW, WM_APP,
    WM_CLOSE, WM_DESTROY, WM_KEYDOWN, WM_LBUTTONDBLCLK, WM_LBUTTONDOWN, WM_LBUTTONUP,
    WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_NCHITTEST, WM_PAINT,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SETCURSOR, WM_SIZE, WNDCLASSEXW, WS_CHILD,
    WS_CLIPCHILDREN, WS_EX_NOREDIRECTIONBITMAP, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
};

const HOST_CLASS: PCWSTR = w!("WinTransformHost");
const SURFACE_CLASS: PCWSTR = w!("WinTransformSurface");

/// Posted by the viewport's layout hook, possibly from the render thread
const WM_VIEWPORT_LAYOUT: u32 = WM_APP + 1;

// Button flags carried in WPARAM of mouse messages
const MK_LBUTTON: usize = 0x0001;
const MK_RBUTTON: usize = 0x0002;
const MK_MBUTTON: usize = 0x0010;

const VK_ESCAPE: usize = 0x1B;

static CLASSES: OnceCell<()> = OnceCell::new();

thread_local! {
    static HOST_STATE: RefCell<Option<HostState>> = const { RefCell::new(None) };
}

struct HostState {
    viewport: SharedViewport,
    machine: InteractionMachine,
    surface: HWND,
    client: Size,
    cursor: CursorShape,
    on_close: Option<Box<dyn FnOnce()>>,
}

fn register_classes(hinstance: HINSTANCE) -> OverlayResult<()> {
    CLASSES
        .get_or_try_init(|| unsafe {
            let host = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW | CS_DBLCLKS,
                lpfnWndProc: Some(host_wnd_proc),
                hInstance: hinstance,
                hbrBackground: HBRUSH(GetStockObject(BLACK_BRUSH).0),
                lpszClassName: HOST_CLASS,
                ..Default::default()
            };
            if RegisterClassExW(&host) == 0 {
                return Err(OverlayError::Windows(windows::core::Error::from_win32()));
            }

            let surface = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(surface_wnd_proc),
                hInstance: hinstance,
                lpszClassName: SURFACE_CLASS,
                ..Default::default()
            };
            if RegisterClassExW(&surface) == 0 {
                return Err(OverlayError::Windows(windows::core::Error::from_win32()));
            }

            Ok(())
        })
        .map(|_| ())
}

/// Top-level window presenting one viewport
pub struct RenderWindow {
    hwnd: HWND,
    surface: HWND,
}

impl RenderWindow {
    /// Create and show the host with a client area of `client` pixels.
    ///
    /// Must be called on the thread that later runs [`RenderWindow::run`].
    pub fn create(title: &str, client: Size, viewport: SharedViewport) -> OverlayResult<Self> {
        if HOST_STATE.with(|s| s.borrow().is_some()) {
            return Err(OverlayError::Window(
                "a render window already exists on this thread".into(),
            ));
        }

        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);
            register_classes(hinstance)?;

            let mut frame = RECT {
                left: 0,
                top: 0,
                right: client.width,
                bottom: client.height,
            };
            AdjustWindowRectEx(
                &mut frame,
                WS_OVERLAPPEDWINDOW,
                false,
                Default::default(),
            )?;

            let title = HSTRING::from(title);
            let hwnd = CreateWindowExW(
                Default::default(),
                HOST_CLASS,
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                frame.right - frame.left,
                frame.bottom - frame.top,
                None,
                None,
                hinstance,
                None,
            )?;

            // Flip-model swap chains present without a redirection surface
            let bounds = viewport.bounds();
            let surface = CreateWindowExW(
                WS_EX_NOREDIRECTIONBITMAP,
                SURFACE_CLASS,
                w!(""),
                WS_CHILD | WS_VISIBLE,
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                hwnd,
                None,
                hinstance,
                None,
            )?;

            let raw_hwnd = hwnd.0 as isize;
            viewport.set_layout_hook(move |_| {
                let hwnd = HWND(raw_hwnd as *mut c_void);
                if let Err(e) = unsafe { PostMessageW(hwnd, WM_VIEWPORT_LAYOUT, WPARAM(0), LPARAM(0)) } {
                    debug!(error = %e, "Layout notification dropped");
                }
            });

            HOST_STATE.with(|s| {
                *s.borrow_mut() = Some(HostState {
                    viewport,
                    machine: InteractionMachine::new(),
                    surface,
                    client,
                    cursor: CursorShape::Arrow,
                    on_close: None,
                });
            });

            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
            info!(width = client.width, height = client.height, "Host window created");

            Ok(Self { hwnd, surface })
        }
    }

    /// Raw handle of the child window the swap chain presents into
    pub fn surface_handle(&self) -> isize {
        self.surface.0 as isize
    }

    /// Run `hook` once when the window is asked to close, while the render
    /// surface still exists.
    pub fn set_close_hook(&self, hook: impl FnOnce() + 'static) {
        HOST_STATE.with(|s| {
            if let Some(state) = s.borrow_mut().as_mut() {
                state.on_close = Some(Box::new(hook));
            }
        });
    }

    /// Pump messages until the window is closed
    pub fn run(self) -> OverlayResult<()> {
        unsafe {
            let mut msg = MSG::default();
            loop {
                let ret = GetMessageW(&mut msg, None, 0, 0);
                if ret.0 == -1 {
                    HOST_STATE.with(|s| s.borrow_mut().take());
                    return Err(OverlayError::Windows(windows::core::Error::from_win32()));
                }
                if !ret.as_bool() {
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        HOST_STATE.with(|s| s.borrow_mut().take());
        info!("Host window closed");
        Ok(())
    }
}

fn loword(value: isize) -> i32 {
    (value & 0xFFFF) as i16 as i32
}

fn hiword(value: isize) -> i32 {
    ((value >> 16) & 0xFFFF) as i16 as i32
}

fn held_buttons(wparam: WPARAM) -> PointerButtons {
    let mut buttons = PointerButtons::NONE;
    if wparam.0 & MK_LBUTTON != 0 {
        buttons = buttons | PointerButtons::LEFT;
    }
    if wparam.0 & MK_RBUTTON != 0 {
        buttons = buttons | PointerButtons::RIGHT;
    }
    if wparam.0 & MK_MBUTTON != 0 {
        buttons = buttons | PointerButtons::MIDDLE;
    }
    buttons
}

unsafe fn pointer_from_message(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> Option<PointerState> {
    let location = Point::new(loword(lparam.0), hiword(lparam.0));
    let (kind, buttons) = match msg {
        WM_LBUTTONDBLCLK => {
            let press = PointerState::new(PointerKind::Down, PointerButtons::LEFT, location);
            return Some(press.with_clicks(2));
        }
        WM_MOUSEWHEEL => {
            // Wheel messages carry screen coordinates
            let mut screen = POINT {
                x: location.x,
                y: location.y,
            };
            let _ = ScreenToClient(hwnd, &mut screen);
            let buttons = held_buttons(WPARAM(wparam.0 & 0xFFFF));
            let delta = hiword(wparam.0 as isize);
            return Some(PointerState::wheel(buttons, Point::new(screen.x, screen.y), delta));
        }
        WM_LBUTTONDOWN => (PointerKind::Down, PointerButtons::LEFT),
        WM_RBUTTONDOWN => (PointerKind::Down, PointerButtons::RIGHT),
        WM_MBUTTONDOWN => (PointerKind::Down, PointerButtons::MIDDLE),
        WM_LBUTTONUP => (PointerKind::Up, PointerButtons::LEFT),
        WM_RBUTTONUP => (PointerKind::Up, PointerButtons::RIGHT),
        WM_MBUTTONUP => (PointerKind::Up, PointerButtons::MIDDLE),
        WM_MOUSEMOVE => (PointerKind::Move, held_buttons(wparam)),
        _ => return None,
    };
    Some(PointerState::new(kind, buttons, location))
}

unsafe fn apply_cursor(shape: CursorShape) {
    match LoadCursorW(None, shape.system_id()) {
        Ok(cursor) => {
            SetCursor(cursor);
        }
        Err(e) => warn!(error = %e, ?shape, "Failed to load cursor"),
    }
}

unsafe fn on_pointer(hwnd: HWND, pointer: PointerState) {
    let outcome: Option<InteractionOutcome> = HOST_STATE.with(|s| {
        let mut state = s.borrow_mut();
        let state = state.as_mut()?;
        let outcome = state
            .machine
            .handle_pointer(pointer, state.client, &state.viewport);
        state.cursor = outcome.cursor;
        Some(outcome)
    });
    let Some(outcome) = outcome else {
        return;
    };

    // Capture changes send messages back into this window procedure
    if outcome.dragging {
        if GetCapture() != hwnd {
            SetCapture(hwnd);
        }
    } else if GetCapture() == hwnd {
        let _ = ReleaseCapture();
    }

    apply_cursor(outcome.cursor);

    if outcome.repaint_outline {
        let _ = InvalidateRect(hwnd, None, true);
    }
}

unsafe fn on_layout(hwnd: HWND) {
    let layout = HOST_STATE.with(|s| {
        s.borrow()
            .as_ref()
            .map(|state| (state.surface, state.viewport.bounds()))
    });
    let Some((surface, bounds)) = layout else {
        return;
    };

    if let Err(e) = SetWindowPos(
        surface,
        None,
        bounds.x,
        bounds.y,
        bounds.width,
        bounds.height,
        SWP_NOZORDER | SWP_NOACTIVATE,
    ) {
        warn!(error = %e, "Failed to move render surface");
    }
    let _ = InvalidateRect(hwnd, None, true);
}

unsafe fn on_paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);

    let outline: Option<Rect> = HOST_STATE.with(|s| {
        s.borrow()
            .as_ref()
            .filter(|state| state.viewport.needs_outline())
            .map(|state| state.viewport.bounds())
    });
    if let Some(bounds) = outline {
        paint_outline(hdc, bounds);
    }

    let _ = EndPaint(hwnd, &ps);
}

unsafe fn close(hwnd: HWND) {
    let hook = HOST_STATE.with(|s| s.borrow_mut().as_mut().and_then(|state| state.on_close.take()));
    if let Some(hook) = hook {
        debug!("Running close hook");
        hook();
    }
    let _ = DestroyWindow(hwnd);
}

unsafe extern "system" fn host_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if let Some(pointer) = pointer_from_message(hwnd, msg, wparam, lparam) {
        on_pointer(hwnd, pointer);
        return LRESULT(0);
    }

    match msg {
        WM_VIEWPORT_LAYOUT => {
            on_layout(hwnd);
            LRESULT(0)
        }

        WM_PAINT => {
            on_paint(hwnd);
            LRESULT(0)
        }

        WM_SETCURSOR if (lparam.0 & 0xFFFF) as u32 == HTCLIENT => {
            let shape = HOST_STATE.with(|s| {
                s.borrow()
                    .as_ref()
                    .map_or(CursorShape::Arrow, |state| state.cursor)
            });
            apply_cursor(shape);
            LRESULT(1)
        }

        WM_SIZE => {
            let client = Size::new(loword(lparam.0), hiword(lparam.0));
            HOST_STATE.with(|s| {
                if let Some(state) = s.borrow_mut().as_mut() {
                    state.client = client;
                }
            });
            debug!(width = client.width, height = client.height, "Host resized");
            LRESULT(0)
        }

        WM_KEYDOWN if wparam.0 == VK_ESCAPE => {
            close(hwnd);
            LRESULT(0)
        }

        WM_CLOSE => {
            close(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// The render surface never takes input; the host underneath receives it
unsafe extern "system" fn surface_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCHITTEST => LRESULT(HTTRANSPARENT as isize),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
