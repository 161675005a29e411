use std::ffi::CString;

use windows::core::{s, PCSTR};
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::{CreateSolidBrush, UpdateWindow};
use windows::Win32::System::LibraryLoader::GetModuleHandleA;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::app::{KeyAction, Sample};
use crate::graphics::{BackendError, Error};

const CLASS_NAME: PCSTR = s!("RustWindowClass");

fn last_error(call: &'static str) -> Error {
    Error::Window(BackendError::hresult(call)(windows::core::Error::from_win32()))
}

/// 创建窗口、把示例绑定到窗口上，然后运行非阻塞的消息循环：没有消息时就渲染一帧。
///
/// 示例本身放在堆上，指针存进窗口的 GWLP_USERDATA，窗口过程从那里取回它，
/// 不需要任何全局变量。渲染失败会销毁窗口并把错误返回给调用方。
pub fn init_sample<S: Sample<Window = HWND>>(sample: S) -> Result<(), Error> {
    let instance = unsafe { GetModuleHandleA(None) }.map_err(Error::window("GetModuleHandleA"))?;
    debug_assert!(!instance.is_invalid());

    // 第一项任务便是通过填写 WNDCLASS 结构体，并根据其中描述的特征来创建一个窗口
    let wc = WNDCLASSEXA {
        cbSize: std::mem::size_of::<WNDCLASSEXA>() as u32,
        // CS_HREDRAW / CS_VREDRAW: 如果移动或大小调整更改了工作区的宽度或高度，将重绘整个窗口。
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc::<S>),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(Error::window("LoadCursorW"))?,
        hbrBackground: unsafe { CreateSolidBrush(COLORREF(rgb(245, 166, 39))) },
        lpszClassName: CLASS_NAME,
        ..Default::default()
    };
    if unsafe { RegisterClassExA(&wc) } == 0 {
        return Err(last_error("RegisterClassExA"));
    }

    let (width, height) = sample.window_size();
    let title = CString::new(sample.title()).unwrap_or_default();
    // 让客户区（而不是整个窗口）恰好是期望的大小
    let mut window_rect = RECT {
        left: 0,
        top: 0,
        right: width as i32,
        bottom: height as i32,
    };
    unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false) };

    let sample = Box::into_raw(Box::new(sample));
    let hwnd = unsafe {
        CreateWindowExA(
            WINDOW_EX_STYLE::default(),
            CLASS_NAME,
            PCSTR(title.as_ptr().cast()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            window_rect.right - window_rect.left,
            window_rect.bottom - window_rect.top,
            None, // no parent window
            None, // no menus
            instance,
            Some(sample as *const _),
        )
    };
    if hwnd.0 == 0 {
        drop(unsafe { Box::from_raw(sample) });
        return Err(last_error("CreateWindowExA"));
    }

    let result = bind_and_run(hwnd, sample);
    // 窗口此时已销毁，on_destroy 已经释放了所有 GPU 资源
    drop(unsafe { Box::from_raw(sample) });
    result
}

/// 客户区大小，交换链和视口按它创建。
fn client_size(hwnd: HWND) -> Result<(u32, u32), Error> {
    let mut client = RECT::default();
    if !unsafe { GetClientRect(hwnd, &mut client) }.as_bool() {
        return Err(last_error("GetClientRect"));
    }
    Ok((
        (client.right - client.left) as u32,
        (client.bottom - client.top) as u32,
    ))
}

fn bind_and_run<S: Sample<Window = HWND>>(hwnd: HWND, sample: *mut S) -> Result<(), Error> {
    let bound = client_size(hwnd)
        .and_then(|(width, height)| unsafe { (*sample).bind_to_window(hwnd, width, height) });
    if let Err(error) = bound {
        unsafe { DestroyWindow(hwnd) };
        return Err(error);
    }

    // 尽管窗口已经创建完毕，但仍没有显示出来。
    unsafe { ShowWindow(hwnd, SW_SHOW) };
    unsafe { UpdateWindow(hwnd) };

    let mut frame_error = None;
    let mut message = MSG::default();
    loop {
        // PeekMessage 在没有消息时立即返回，空闲时间用来渲染。
        if unsafe { PeekMessageA(&mut message, None, 0, 0, PM_REMOVE) }.into() {
            if message.message == WM_QUIT {
                break;
            }
            unsafe {
                TranslateMessage(&message);
                DispatchMessageA(&message);
            }
        } else if frame_error.is_none() {
            if let Err(error) = unsafe { (*sample).render() } {
                log::error!("frame failed: {error}");
                frame_error = Some(error);
                unsafe { DestroyWindow(hwnd) };
            }
        }
    }

    match frame_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    r as u32 | (g as u32) << 8 | (b as u32) << 16
}

impl Error {
    fn window(call: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
        move |error| Error::Window(BackendError::hresult(call)(error))
    }
}

/// 只有这两种消息会访问示例。WM_KEYDOWN 只经由消息循环投递；WM_DESTROY 只来自
/// 我们自己在 bind_to_window / render 返回之后调用的 DestroyWindow。两者都不会在
/// 这两个调用执行期间（例如 DXGI 同步发送窗口消息时）重入。
fn routes_to_sample(message: u32) -> bool {
    matches!(message, WM_KEYDOWN | WM_DESTROY)
}

/// 从 GWLP_USERDATA 取回示例，引用只在 `f` 内有效。
fn with_sample<S, R>(window: HWND, f: impl FnOnce(&mut S) -> R) -> Option<R> {
    let user_data = unsafe { GetWindowLong(window, GWLP_USERDATA) };
    std::ptr::NonNull::<S>::new(user_data as _).map(|mut s| f(unsafe { s.as_mut() }))
}

fn confirm_exit(window: HWND) -> bool {
    let answer = unsafe {
        MessageBoxA(
            window,
            s!("Are you sure you want to exit?"),
            s!("Exit Window"),
            MB_YESNO | MB_ICONQUESTION,
        )
    };
    answer == IDYES
}

#[allow(non_snake_case)]
#[cfg(target_pointer_width = "32")]
unsafe fn SetWindowLong(window: HWND, index: WINDOW_LONG_PTR_INDEX, value: isize) -> isize {
    SetWindowLongA(window, index, value as _) as _
}

#[allow(non_snake_case)]
#[cfg(target_pointer_width = "64")]
unsafe fn SetWindowLong(window: HWND, index: WINDOW_LONG_PTR_INDEX, value: isize) -> isize {
    SetWindowLongPtrA(window, index, value)
}

#[allow(non_snake_case)]
#[cfg(target_pointer_width = "32")]
unsafe fn GetWindowLong(window: HWND, index: WINDOW_LONG_PTR_INDEX) -> isize {
    GetWindowLongA(window, index) as _
}

#[allow(non_snake_case)]
#[cfg(target_pointer_width = "64")]
unsafe fn GetWindowLong(window: HWND, index: WINDOW_LONG_PTR_INDEX) -> isize {
    GetWindowLongPtrA(window, index)
}

/// 窗口过程会处理窗口所接收到的消息
extern "system" fn wndproc<S: Sample<Window = HWND>>(
    window: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if message == WM_CREATE {
        unsafe {
            let create_struct = &*(lparam.0 as *const CREATESTRUCTA);
            // 这里只保存裸指针；`&mut S` 仅在 routes_to_sample 放行的消息里临时创建，
            // 因此不会和 bind_and_run 手里的引用同时存在。
            SetWindowLong(window, GWLP_USERDATA, create_struct.lpCreateParams as _);
        }
        return LRESULT::default();
    }
    if !routes_to_sample(message) {
        return unsafe { DefWindowProcA(window, message, wparam, lparam) };
    }

    match message {
        WM_KEYDOWN => {
            // 先放开对示例的引用，再弹框或销毁窗口：DestroyWindow 会同步送来 WM_DESTROY。
            let action = with_sample::<S, _>(window, |sample| sample.on_key_down(wparam.0 as u8));
            if action == Some(KeyAction::ConfirmExit) && confirm_exit(window) {
                unsafe { DestroyWindow(window) };
            }
        }
        _ => {
            // WM_DESTROY：交换链必须在窗口消失之前释放
            with_sample::<S, _>(window, |sample| sample.on_destroy());
            // 之后到达的消息（如 WM_NCDESTROY）不再访问示例
            unsafe { SetWindowLong(window, GWLP_USERDATA, 0) };
            unsafe { PostQuitMessage(0) };
        }
    }
    LRESULT::default()
}
