//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JByteArray, JClass, JString};
use jni::sys::{jint, jstring};
use jni::JNIEnv;

use crate::{read_bytes_to_json, DynamicCatalog};

/// Read the dynamics of a score file's bytes as JSON.
///
/// Called from Kotlin as:
///   external fun readDynamics(data: ByteArray, extension: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_scoredyn_DynamicsLib_readDynamics(
    mut env: JNIEnv,
    _class: JClass,
    data: JByteArray,
    extension: JString,
) -> jstring {
    let bytes = match env.convert_byte_array(&data) {
        Ok(b) => b,
        Err(_) => return std::ptr::null_mut(),
    };

    let ext: Option<String> = if extension.is_null() {
        None
    } else {
        env.get_string(&extension).ok().map(|s| s.into())
    };

    match read_bytes_to_json(&bytes, ext.as_deref()) {
        Ok(json) => match env.new_string(&json) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(_) => std::ptr::null_mut(),
    }
}

/// Effective velocity of a dynamic tag, or -1 if unknown.
///
/// Called from Kotlin as:
///   external fun tagVelocity(tag: String): Int
#[no_mangle]
pub extern "system" fn Java_com_scoredyn_DynamicsLib_tagVelocity(
    mut env: JNIEnv,
    _class: JClass,
    tag: JString,
) -> jint {
    let tag: String = match env.get_string(&tag) {
        Ok(s) => s.into(),
        Err(_) => return -1,
    };
    let cat = DynamicCatalog::standard();
    cat.find_by_tag(&tag)
        .and_then(|i| cat.entry_at(i))
        .map_or(-1, |e| e.velocity)
}
