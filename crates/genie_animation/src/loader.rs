use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    reflect::TypePath,
};
use genie_animation_core::prelude::{AvatarRigConfig, ConfigError};

#[derive(Default, TypePath)]
pub struct AvatarRigConfigLoader;

impl AssetLoader for AvatarRigConfigLoader {
    type Asset = AvatarRigConfig;
    type Settings = ();
    type Error = ConfigError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        read_config(reader).await
    }

    fn extensions(&self) -> &[&str] {
        &["rig.ron"]
    }
}

async fn read_config(reader: &mut dyn Reader) -> Result<AvatarRigConfig, ConfigError> {
    let mut bytes = vec![];
    reader.read_to_end(&mut bytes).await?;
    AvatarRigConfig::from_ron_bytes(&bytes)
}
