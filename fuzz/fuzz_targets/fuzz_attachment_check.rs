#![no_main]

use chorus_pro::core::{Attachment, check_attachment_set};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // One attachment per line: "<name>\t<size>"
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let attachments: Vec<Attachment> = s
        .lines()
        .map(|line| {
            let (name, size) = line.split_once('\t').unwrap_or((line, "1"));
            Attachment::with_size(name, size.parse().unwrap_or(0))
        })
        .collect();
    let _ = check_attachment_set(&attachments);
});
