use booth_gallery_core::config::SECTION;
use booth_gallery_core::GalleryPlugin;

/// Print the `[GALLERY]` block with every option at its default.
pub fn execute() {
    println!("[{SECTION}]");
    for option in GalleryPlugin::configure() {
        println!();
        println!("# {}", option.help);
        println!("{} = {}", option.key, option.default);
    }
}
