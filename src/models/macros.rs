#[macro_export]
macro_rules! starboard {
    ($ctx: expr) => {
        {
            let ctx_global = $ctx.data.read().await;
            let out = ctx_global.get::<$crate::commands::starboard::Starboard>().expect("Couldn't find starboard").clone();

            out
        }
    }
}

#[macro_export]
macro_rules! dozerboard {
    ($ctx: expr) => {
        {
            $crate::starboard!($ctx.serenity_context())
        }
    }
}
