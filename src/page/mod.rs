mod props;
mod render;

pub use props::{
    EPISODES_PAGE_SIZE, HomeProps, LATEST_EPISODES_COUNT, REVALIDATE_SECONDS, StaticProps,
    get_static_props, partition_episodes,
};
pub use render::{HomePage, PLAY_ICON_PATH, PLAY_ICON_SVG, PlayControl, render_client_shell};
