use core::ffi::c_void;

use glam::Vec2;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, RECT, TRUE};
use windows::Win32::Graphics::Dwm::{
    DwmGetWindowAttribute, DWMWA_CLOAKED, DWMWA_EXTENDED_FRAME_BOUNDS,
};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO,
};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetCursorPos, GetWindowLongPtrW, GetWindowRect, GetWindowTextLengthW,
    GetWindowTextW, IsIconic, SetWindowLongPtrW, SetWindowPos, GWL_EXSTYLE, GWL_STYLE,
    SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW, WS_THICKFRAME, WS_VISIBLE,
};

use super::{InputSnapshot, Keys};
use crate::desktop::{
    MonitorId, MonitorSource, RawMonitor, Rect, WindowId, WindowInfo, WindowSource,
};

/// The desktop shell's top-level window.
const SHELL_TITLE: &str = "Program Manager";

const VK_LBUTTON: i32 = 0x01;
const VK_RBUTTON: i32 = 0x02;
const VK_ESCAPE: i32 = 0x1B;
const VK_DELETE: i32 = 0x2E;
const VK_D: i32 = 0x44;
const VK_S: i32 = 0x53;
const VK_F3: i32 = 0x72;

/// Extract the Win32 HWND from a winit window.
pub fn get_hwnd(window: &winit::window::Window) -> Option<HWND> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Some(HWND(h.hwnd.get() as *mut c_void)),
        _ => None,
    }
}

/// Keep the overlay out of the taskbar and Alt-Tab, and never let it take
/// activation from the window the user is working in.
pub unsafe fn make_overlay(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    let new_style = style | WS_EX_NOACTIVATE.0 as isize | WS_EX_TOOLWINDOW.0 as isize;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_style);
    log::debug!("Overlay ex-style 0x{style:08X} -> 0x{new_style:08X}");

    // Force DWM to pick up the new styles.
    let _ = SetWindowPos(
        hwnd,
        HWND::default(),
        0,
        0,
        0,
        0,
        SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    );
}

fn key_down(vk: i32) -> bool {
    // High bit set = key is currently down.
    unsafe { GetAsyncKeyState(vk) & (0x8000u16 as i16) != 0 }
}

/// Cursor, buttons and hotkeys, read regardless of which window has focus.
pub fn poll_input() -> InputSnapshot {
    let mut point = POINT::default();
    unsafe {
        let _ = GetCursorPos(&mut point);
    }

    InputSnapshot {
        cursor: Vec2::new(point.x as f32, point.y as f32),
        left: key_down(VK_LBUTTON),
        right: key_down(VK_RBUTTON),
        keys: Keys {
            escape: key_down(VK_ESCAPE),
            f3: key_down(VK_F3),
            duplicate: key_down(VK_D),
            delete: key_down(VK_DELETE),
            save: key_down(VK_S),
        },
    }
}

// ---------------------------------------------------------------------------
// Window enumeration
// ---------------------------------------------------------------------------

/// Top-level application windows in Z order, front-most first.
///
/// Holds the overlay handle as a plain integer so the source can move to the
/// enumeration thread.
pub struct Win32Windows {
    own: isize,
    overlay_title: String,
}

impl Win32Windows {
    pub fn new(own: isize, overlay_title: &str) -> Self {
        Self {
            own,
            overlay_title: overlay_title.to_string(),
        }
    }
}

impl WindowSource for Win32Windows {
    fn enumerate(&mut self) -> Vec<WindowInfo> {
        struct EnumState<'a> {
            own: isize,
            overlay_title: &'a str,
            results: Vec<WindowInfo>,
        }

        unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let state = &mut *(lparam.0 as *mut EnumState);
            if hwnd.0 as isize == state.own {
                return TRUE;
            }
            if let Some(info) = describe(hwnd) {
                if info.title != SHELL_TITLE && info.title != state.overlay_title {
                    state.results.push(info);
                }
            }
            TRUE
        }

        let mut state = EnumState {
            own: self.own,
            overlay_title: &self.overlay_title,
            results: Vec::with_capacity(64),
        };

        unsafe {
            let _ = EnumWindows(
                Some(enum_callback),
                LPARAM(&mut state as *mut EnumState as isize),
            );
        }

        state.results
    }
}

/// Geometry and title of `hwnd`, or `None` when cats should ignore it.
unsafe fn describe(hwnd: HWND) -> Option<WindowInfo> {
    // Only visible, resizable, framed windows.
    let style = GetWindowLongPtrW(hwnd, GWL_STYLE) as u32;
    if style & WS_VISIBLE.0 == 0 || style & WS_THICKFRAME.0 == 0 {
        return None;
    }
    if IsIconic(hwnd).as_bool() {
        return None;
    }

    // Suspended UWP apps and windows on other virtual desktops.
    let mut cloaked = 0u32;
    let cloaked_ok = DwmGetWindowAttribute(
        hwnd,
        DWMWA_CLOAKED,
        &mut cloaked as *mut u32 as *mut c_void,
        std::mem::size_of::<u32>() as u32,
    )
    .is_ok();
    if cloaked_ok && cloaked != 0 {
        return None;
    }

    let len = GetWindowTextLengthW(hwnd);
    if len <= 0 {
        return None;
    }
    let mut buf = vec![0u16; len as usize + 1];
    let copied = GetWindowTextW(hwnd, &mut buf);
    let title = String::from_utf16_lossy(&buf[..copied.max(0) as usize]);

    let rect = frame_bounds(hwnd)?;
    if rect.width() <= 1 && rect.height() <= 1 {
        return None;
    }

    Some(WindowInfo {
        id: WindowId(hwnd.0 as isize),
        rect,
        title,
    })
}

/// Visible frame without the invisible resize borders, or the plain window
/// rectangle when DWM cannot tell.
unsafe fn frame_bounds(hwnd: HWND) -> Option<Rect> {
    let mut rect = RECT::default();
    let dwm = DwmGetWindowAttribute(
        hwnd,
        DWMWA_EXTENDED_FRAME_BOUNDS,
        &mut rect as *mut RECT as *mut c_void,
        std::mem::size_of::<RECT>() as u32,
    );
    if dwm.is_err() && GetWindowRect(hwnd, &mut rect).is_err() {
        return None;
    }
    Some(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
}

// ---------------------------------------------------------------------------
// Monitor enumeration
// ---------------------------------------------------------------------------

/// Attached displays in `EnumDisplayMonitors` order.
pub struct Win32Monitors;

impl MonitorSource for Win32Monitors {
    fn enumerate(&mut self) -> Vec<RawMonitor> {
        unsafe extern "system" fn enum_proc(
            monitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            data: LPARAM,
        ) -> BOOL {
            let monitors = &mut *(data.0 as *mut Vec<RawMonitor>);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if GetMonitorInfoW(monitor, &mut info).as_bool() {
                let r = info.rcMonitor;
                let w = info.rcWork;
                monitors.push(RawMonitor {
                    id: MonitorId(monitor.0 as isize),
                    full: Rect::new(r.left, r.top, r.right, r.bottom),
                    work: Rect::new(w.left, w.top, w.right, w.bottom),
                });
            } else {
                log::warn!("GetMonitorInfoW failed for {:?}", monitor.0);
            }
            TRUE
        }

        let mut monitors: Vec<RawMonitor> = Vec::new();
        unsafe {
            let _ = EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(enum_proc),
                LPARAM(&mut monitors as *mut Vec<RawMonitor> as isize),
            );
        }
        monitors
    }
}
