/// Installs `window.__lessonPlayer` around a YouTube iframe player mounted on
/// `element_id`. Commands issued before the player is ready are queued.
/// Messages sent back: `ready`, `state { code }`, `time { secs }`.
pub(super) fn player_bridge_script(element_id: &str, time_report_ms: u32) -> String {
    format!(
        r#"(function() {{
                    const elementId = {element_id:?};
                    const queue = [];
                    if (window.__lessonPlayer && window.__lessonPlayer.timer) {{
                        clearInterval(window.__lessonPlayer.timer);
                    }}
                    const api = window.__lessonPlayer = {{
                        player: null,
                        ready: false,
                        timer: null,
                        run(fn) {{
                            if (this.ready) fn(this.player); else queue.push(fn);
                        }},
                        load(videoId, start, end) {{
                            this.run(p => p.cueVideoById({{ videoId, startSeconds: start, endSeconds: end }}));
                        }},
                        seek(secs) {{ this.run(p => p.seekTo(secs, true)); }},
                        play() {{ this.run(p => p.playVideo()); }},
                        pause() {{ this.run(p => p.pauseVideo()); }},
                        rate(value) {{ this.run(p => p.setPlaybackRate(value)); }},
                        quality(value) {{ this.run(p => p.setPlaybackQuality(value)); }},
                        captions(on) {{
                            this.run(p => on ? p.loadModule("captions") : p.unloadModule("captions"));
                        }},
                    }};
                    const create = () => {{
                        api.player = new YT.Player(elementId, {{
                            playerVars: {{ controls: 0, rel: 0, modestbranding: 1, fs: 1 }},
                            events: {{
                                onReady: () => {{
                                    api.ready = true;
                                    while (queue.length) queue.shift()(api.player);
                                    dioxus.send({{ type: "ready" }});
                                }},
                                onStateChange: (event) => dioxus.send({{ type: "state", code: event.data }}),
                            }},
                        }});
                        api.timer = setInterval(() => {{
                            if (!document.getElementById(elementId)) {{
                                clearInterval(api.timer);
                                return;
                            }}
                            if (api.ready && api.player.getCurrentTime) {{
                                dioxus.send({{ type: "time", secs: api.player.getCurrentTime() }});
                            }}
                        }}, {time_report_ms});
                    }};
                    if (window.YT && window.YT.Player) {{
                        create();
                    }} else {{
                        window.onYouTubeIframeAPIReady = create;
                        const tag = document.createElement("script");
                        tag.src = "https://www.youtube.com/iframe_api";
                        document.head.appendChild(tag);
                    }}
                }})();"#,
    )
}

pub(super) fn player_call_script(call: &str) -> String {
    format!("if (window.__lessonPlayer) {{ window.__lessonPlayer.{call}; }}")
}
